//! Final release: suppress undersized classes and report what was removed.

use genlattice_core::{equivalence_class_sizes, project, round_to, Record};
use genlattice_lattice::suppression_budget;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseStats {
    pub eq_classes_before_sup: usize,
    pub suppressed_classes: usize,
    pub suppressed_records: usize,
    /// Percentage of the input records, two decimals.
    pub perc_suppressed_records: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub records: Vec<Record>,
    pub stats: ReleaseStats,
}

/// Drop every record whose class on `columns` has fewer than `k` members.
/// Surviving records keep their input order.
pub fn make_release(records: Vec<Record>, columns: &[usize], k: usize) -> Release {
    let original_size = records.len();
    let classes = equivalence_class_sizes(&records, columns);

    let suppressed: Vec<usize> = classes.values().copied().filter(|&size| size < k).collect();
    let suppressed_records: usize = suppressed.iter().sum();
    let perc = if original_size == 0 {
        0.0
    } else {
        round_to(suppressed_records as f64 / original_size as f64 * 100.0, 2)
    };

    let kept = records
        .into_iter()
        .filter(|r| {
            let signature = project(r, columns);
            classes.get(&signature).map_or(false, |&size| size >= k)
        })
        .collect();

    Release {
        records: kept,
        stats: ReleaseStats {
            eq_classes_before_sup: classes.len(),
            suppressed_classes: suppressed.len(),
            suppressed_records,
            perc_suppressed_records: perc,
        },
    }
}

/// Largest k reachable by suppressing at most `max_sup` percent of the records.
///
/// Class sizes are consumed smallest first; the first one that no longer fits
/// in the remaining budget is k. When every class fits, k is the record count.
pub fn feasible_k(records: &[Record], columns: &[usize], max_sup: f64) -> usize {
    let mut budget = suppression_budget(records.len(), max_sup);
    let mut sizes: Vec<usize> = equivalence_class_sizes(records, columns).into_values().collect();
    sizes.sort_unstable();

    for size in sizes {
        if size > budget {
            return size;
        }
        budget -= size;
    }
    records.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use genlattice_core::Value;

    fn records(classes: &[(&str, usize)]) -> Vec<Record> {
        classes
            .iter()
            .flat_map(|(s, n)| std::iter::repeat(vec![Value::from(*s), Value::from("x")]).take(*n))
            .collect()
    }

    #[test]
    fn test_make_release_suppresses_small_classes() {
        let release = make_release(records(&[("a", 3), ("b", 1), ("c", 1)]), &[0], 2);
        assert_eq!(
            release.stats,
            ReleaseStats {
                eq_classes_before_sup: 3,
                suppressed_classes: 2,
                suppressed_records: 2,
                perc_suppressed_records: 40.0,
            }
        );
        assert_eq!(release.records.len(), 3);
        assert!(release.records.iter().all(|r| r[0] == Value::from("a")));
    }

    #[test]
    fn test_make_release_rounds_percentage() {
        let release = make_release(records(&[("a", 2), ("b", 1)]), &[0], 2);
        assert_eq!(release.stats.perc_suppressed_records, 33.33);
    }

    #[test]
    fn test_make_release_empty() {
        let release = make_release(Vec::new(), &[0], 2);
        assert_eq!(release.stats.perc_suppressed_records, 0.0);
        assert_eq!(release.stats.eq_classes_before_sup, 0);
    }

    #[test]
    fn test_feasible_k() {
        let r = records(&[("a", 6), ("b", 3), ("c", 1)]);
        // no budget: the smallest class bounds k
        assert_eq!(feasible_k(&r, &[0], 0.0), 1);
        // budget of 1 record absorbs the singleton
        assert_eq!(feasible_k(&r, &[0], 10.0), 3);
        // budget of 5 absorbs 1 and 3, leaving 1
        assert_eq!(feasible_k(&r, &[0], 50.0), 6);
        assert_eq!(feasible_k(&r, &[0], 100.0), 10);
    }
}
