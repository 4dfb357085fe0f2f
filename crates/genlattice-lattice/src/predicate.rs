//! Privacy predicates evaluated on lattice nodes.

use genlattice_core::{equivalence_class_sizes, Record, Result};
use genlattice_metrics::{InfoLossMetric, MetricInput};
use genlattice_rules::protected_columns;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Every equivalence class has at least `k` records, up to `max_sup` percent
    /// of the records suppressed.
    KAnonymous { k: usize, max_sup: f64 },
    /// Information loss does not exceed `max_loss`.
    InfoLossBound { metric: InfoLossMetric, max_loss: f64 },
}

impl Predicate {
    /// Whether evaluation needs the generalized records rather than just the state.
    pub fn needs_release(&self) -> bool {
        match self {
            Self::KAnonymous { .. } => true,
            Self::InfoLossBound { metric, .. } => metric.needs_release(),
        }
    }

    pub fn holds(&self, input: &MetricInput<'_>) -> Result<bool> {
        match self {
            Self::KAnonymous { k, max_sup } => {
                let records = input.release.unwrap_or(input.original);
                Ok(is_k_anonymous(
                    records,
                    &protected_columns(input.rules),
                    *k,
                    *max_sup,
                ))
            }
            Self::InfoLossBound { metric, max_loss } => {
                let loss = metric.compute(input)?;
                debug!("{} = {} for {} (bound {})", metric, loss, input.state, max_loss);
                Ok(loss <= *max_loss)
            }
        }
    }
}

/// Number of records that may be suppressed: `floor(len * max_sup / 100)`.
pub fn suppression_budget(n_records: usize, max_sup: f64) -> usize {
    (n_records as f64 * max_sup.max(0.0) / 100.0).floor() as usize
}

/// k-anonymity with suppression, stopping at the first class that overruns the budget.
pub fn is_k_anonymous(records: &[Record], columns: &[usize], k: usize, max_sup: f64) -> bool {
    let mut budget = suppression_budget(records.len(), max_sup);

    debug!("Making equivalence classes");
    let classes = equivalence_class_sizes(records, columns);

    debug!("Checking that all {} equivalence classes have size {}", classes.len(), k);
    for &size in classes.values() {
        if size < k {
            if budget < size {
                debug!("--> was not k-anonymous");
                return false;
            }
            budget -= size;
        }
    }

    debug!("--> was k-anonymous");
    true
}

/// Full k-anonymity check: the verdict plus the percentage of records in
/// classes smaller than `k`.
pub fn k_anonymity_profile(
    records: &[Record],
    columns: &[usize],
    k: usize,
    max_sup: f64,
) -> (bool, f64) {
    if records.is_empty() {
        return (true, 0.0);
    }
    let budget = suppression_budget(records.len(), max_sup);
    let undersized: usize = equivalence_class_sizes(records, columns)
        .values()
        .filter(|&&size| size < k)
        .sum();

    (
        undersized <= budget,
        undersized as f64 / records.len() as f64 * 100.0,
    )
}
