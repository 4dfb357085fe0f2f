//! Frontier search over the generalization lattice.
//!
//! OLA finds the minimal k-anonymous generalization states, Inverse-OLA the
//! maximal states within an information-loss bound. Both bisect the lattice by
//! height and rely on predictive tagging to skip evaluations.

pub mod frontier;
pub mod release;
pub mod run;
pub mod search;

pub use frontier::{Frontier, FrontierKind};
pub use release::{feasible_k, make_release, Release, ReleaseStats};
pub use run::{run_inverse_ola, run_ola, InverseOlaOutcome, OlaOutcome};
pub use search::{info_loss_maximal, k_minimal};
