//! Differentially private choice of a generalization strategy.
//!
//! Every lattice node is scored by a penalized precision loss and sampled with
//! the exponential mechanism. [`parameters`] gives the (epsilon, delta)
//! guarantee of running k-anonymization on a random sample.

pub mod distribution;
pub mod mechanism;
pub mod params;
pub mod stats;

pub use distribution::{build_distribution, DistributionNode, LatticeDistribution};
pub use mechanism::{compute_utility, epsilon_safe_ola, sample, ExponentialMechanism, PenaltyMode};
pub use params::{get_beta, parameters, DpParameters};
pub use stats::{output_stats, OutputStats};
