//! Information-loss metrics.
//!
//! Precision-style metrics only look at the generalization state; `DM*` and
//! `Entropy` need the generalized records.

pub mod loss;
pub mod penalty;

pub use loss::{InfoLossMetric, MetricInput};
pub use penalty::PenalizedPrec;
