//! Generalization rules: a pure `(value, level) -> value` map with a maximum level.
//!
//! Every rule returns its input unchanged at level 0 and a single constant at
//! `max_level`, so the all-max generalization state is always safe.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use genlattice_core::{Error, Result, Value};

/// Column index → rule for every protected (quasi-identifier) column.
pub type RuleSet = BTreeMap<usize, GeneralizationRule>;

/// Protected columns of a rule set, ascending.
pub fn protected_columns(rules: &RuleSet) -> Vec<usize> {
    rules.keys().copied().collect()
}

#[derive(Debug, Clone)]
pub enum GeneralizationRule {
    /// Numeric bucketing with a bucket width per level.
    NumericRange(RangeBuckets),
    /// Fixed categorical hierarchy.
    Hierarchy(Arc<Hierarchy>),
    /// Numeric thresholds mapped to labels at level 1.
    Bands(Arc<Bands>),
    /// Code prefix at level 1 (ICD style).
    Prefix {
        name: &'static str,
        keep: usize,
        top: &'static str,
    },
    /// Keep or suppress.
    Suppress,
}

impl GeneralizationRule {
    pub fn name(&self) -> &str {
        match self {
            Self::NumericRange(r) => r.name.as_str(),
            Self::Hierarchy(h) => h.name.as_str(),
            Self::Bands(b) => b.name.as_str(),
            Self::Prefix { name, .. } => *name,
            Self::Suppress => "suppress",
        }
    }

    pub fn max_level(&self) -> u32 {
        match self {
            Self::NumericRange(r) => r.widths.len().saturating_sub(1) as u32,
            Self::Hierarchy(h) => h.levels.len() as u32 + 1,
            Self::Bands(_) | Self::Prefix { .. } => 2,
            Self::Suppress => 1,
        }
    }

    /// Generalize `value` to `level`.
    pub fn apply(&self, value: &Value, level: u32) -> Result<Value> {
        if level > self.max_level() {
            return Err(Error::unsupported(self.name(), value, level));
        }
        if level == 0 {
            return Ok(value.clone());
        }
        match self {
            Self::NumericRange(r) => r.bucket(value, level),
            Self::Hierarchy(h) => h.lookup(value, level),
            Self::Bands(b) => b.band(value, level),
            Self::Prefix { name, keep, top } => {
                if level == 2 {
                    return Ok(Value::text(*top));
                }
                let code = match value {
                    Value::Text(s) => s.clone(),
                    Value::Int(n) => n.to_string(),
                    _ => return Err(Error::unsupported(name, value, level)),
                };
                let prefix: String = code.trim().chars().take(*keep).collect();
                if prefix.is_empty() {
                    return Err(Error::unsupported(name, value, level));
                }
                Ok(Value::Text(prefix))
            }
            Self::Suppress => Ok(Value::Suppressed),
        }
    }
}

/// Range bucketing over `[min, max]`; `widths[level]` is the bucket width at that level.
#[derive(Debug, Clone)]
pub struct RangeBuckets {
    pub name: String,
    pub min: i64,
    pub max: i64,
    pub widths: Vec<i64>,
}

impl RangeBuckets {
    fn bucket(&self, value: &Value, level: u32) -> Result<Value> {
        let unsupported = || Error::unsupported(&self.name, value, level);
        let (low, high) = match value {
            Value::Range { low, high } => (*low, *high),
            other => {
                let n = other.as_int().ok_or_else(unsupported)?;
                (n, n)
            }
        };
        if low > high || low < self.min || high > self.max {
            return Err(unsupported());
        }
        let width = self
            .widths
            .get(level as usize)
            .copied()
            .filter(|w| *w > 0)
            .ok_or_else(unsupported)?;

        let bucket_low = self.min + (low - self.min) / width * width;
        let bucket_high = (bucket_low + width - 1).min(self.max);
        if high > bucket_high {
            return Err(unsupported());
        }
        Ok(Value::Range {
            low: bucket_low,
            high: bucket_high,
        })
    }
}

/// Categorical hierarchy. `levels[i]` maps an original value to its label at level `i + 1`;
/// the level above the last table is the constant `top`.
///
/// With a `domain`, values outside it are rejected at every level above 0,
/// including the top.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    pub name: String,
    pub levels: Vec<HashMap<String, String>>,
    pub top: String,
    pub domain: Option<HashSet<String>>,
}

impl Hierarchy {
    pub fn new(name: impl Into<String>, top: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            levels: Vec::new(),
            top: top.into(),
            domain: None,
        }
    }

    /// Restrict accepted values to `members`.
    pub fn domain(mut self, members: &[&str]) -> Self {
        self.domain = Some(members.iter().map(|m| m.to_string()).collect());
        self
    }

    /// Append a level given as `(label, members)` groups.
    pub fn level(mut self, groups: &[(&str, &[&str])]) -> Self {
        let mut table = HashMap::new();
        for (label, members) in groups {
            for member in *members {
                table.insert(member.to_string(), label.to_string());
            }
        }
        self.levels.push(table);
        self
    }

    fn lookup(&self, value: &Value, level: u32) -> Result<Value> {
        if let Some(domain) = &self.domain {
            if !value.as_text().map_or(false, |v| domain.contains(v)) {
                return Err(Error::unsupported(&self.name, value, level));
            }
        }
        if level as usize > self.levels.len() {
            return Ok(Value::text(self.top.clone()));
        }
        let table = &self.levels[level as usize - 1];
        value
            .as_text()
            .and_then(|v| table.get(v))
            .map(|label| Value::text(label.clone()))
            .ok_or_else(|| Error::unsupported(&self.name, value, level))
    }
}

/// Numeric banding: `bands` are `(inclusive upper bound, label)` in ascending order,
/// `overflow` labels values above the last bound.
#[derive(Debug, Clone)]
pub struct Bands {
    pub name: String,
    pub bands: Vec<(i64, String)>,
    pub overflow: String,
    pub top: String,
}

impl Bands {
    fn band(&self, value: &Value, level: u32) -> Result<Value> {
        if level >= 2 {
            return Ok(Value::text(self.top.clone()));
        }
        let n = value
            .as_int()
            .ok_or_else(|| Error::unsupported(&self.name, value, level))?;
        let label = self
            .bands
            .iter()
            .find(|(upper, _)| n <= *upper)
            .map(|(_, label)| label.as_str())
            .unwrap_or(self.overflow.as_str());
        Ok(Value::text(label))
    }
}
