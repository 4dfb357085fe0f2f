//! Record model and equivalence-class grouping.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell of a record, before or after generalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Fully suppressed cell.
    Suppressed,
    Int(i64),
    /// Closed numeric interval produced by range bucketing.
    Range { low: i64, high: i64 },
    Text(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret the value as an integer, parsing numeric text.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suppressed => write!(f, "*"),
            Self::Int(n) => write!(f, "{}", n),
            Self::Range { low, high } => write!(f, "[{}-{}]", low, high),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// Fixed-width row; column index is the position in the vector.
pub type Record = Vec<Value>;

/// Tuple of values a record takes on a set of columns.
pub type Signature = Vec<Value>;

/// Project a record onto `columns`, in the order given.
///
/// Columns beyond the end of the row project to [`Value::Suppressed`].
pub fn project(record: &[Value], columns: &[usize]) -> Signature {
    columns
        .iter()
        .map(|&c| record.get(c).cloned().unwrap_or(Value::Suppressed))
        .collect()
}

/// Count records per distinct signature on `columns`.
pub fn equivalence_class_sizes(records: &[Record], columns: &[usize]) -> HashMap<Signature, usize> {
    group_by_columns(records, columns)
        .into_iter()
        .map(|(signature, members)| (signature, members.len()))
        .collect()
}

/// Group records per distinct signature on `columns`, keeping input order inside a class.
pub fn group_by_columns<'a>(
    records: &'a [Record],
    columns: &[usize],
) -> HashMap<Signature, Vec<&'a Record>> {
    let mut classes: HashMap<Signature, Vec<&'a Record>> = HashMap::new();
    for r in records {
        classes.entry(project(r, columns)).or_default().push(r);
    }
    classes
}

/// Round half away from zero to `decimals` places.
pub fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Record {
        values.iter().map(|v| Value::from(*v)).collect()
    }

    #[test]
    fn test_class_sizes() {
        let records = vec![
            row(&["Black", "Male", "Rich"]),
            row(&["Black", "Male", "Poor"]),
            row(&["White", "Woman", "Rich"]),
        ];
        let sizes = equivalence_class_sizes(&records, &[0, 1]);
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes[&row(&["Black", "Male"])], 2);
        assert_eq!(sizes[&row(&["White", "Woman"])], 1);
    }

    #[test]
    fn test_group_keeps_order() {
        let records = vec![row(&["a", "1"]), row(&["b", "2"]), row(&["a", "3"])];
        let groups = group_by_columns(&records, &[0]);
        let a = &groups[&row(&["a"])];
        assert_eq!(a.len(), 2);
        assert_eq!(a[0][1], Value::from("1"));
        assert_eq!(a[1][1], Value::from("3"));
    }

    #[test]
    fn test_class_sizes_match_groups() {
        let records = vec![row(&["a", "1"]), row(&["b", "2"]), row(&["a", "3"]), row(&["a", "1"])];
        let groups = group_by_columns(&records, &[0]);
        let sizes = equivalence_class_sizes(&records, &[0]);
        assert_eq!(sizes.len(), groups.len());
        for (signature, members) in &groups {
            assert_eq!(sizes[signature], members.len());
        }
    }

    #[test]
    fn test_project_out_of_range() {
        let r = row(&["x"]);
        assert_eq!(project(&r, &[0, 3]), vec![Value::from("x"), Value::Suppressed]);
    }

    #[test]
    fn test_as_int() {
        assert_eq!(Value::from("42").as_int(), Some(42));
        assert_eq!(Value::Int(7).as_int(), Some(7));
        assert_eq!(Value::from("forty").as_int(), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(40.0, 2), 40.0);
        assert_eq!(round_to(1.0 / 3.0 * 100.0, 2), 33.33);
    }

    #[test]
    fn test_value_serde_untagged() {
        let json = serde_json::to_string(&vec![
            Value::Int(3),
            Value::Range { low: 0, high: 9 },
            Value::Suppressed,
        ])
        .unwrap();
        assert_eq!(json, r#"[3,{"low":0,"high":9},null]"#);
    }
}
