//! The generalization lattice.
//!
//! Nodes live in a petgraph arena keyed by their [`GenState`](genlattice_rules::GenState)
//! and are created on demand. Each node carries a write-once suitability tag that is
//! propagated predictively over the lattice order once set.

pub mod network;
pub mod predicate;

pub use network::{Lattice, LatticeCounters, LatticeNode, NodeId, TagDirection};
pub use predicate::{is_k_anonymous, k_anonymity_profile, suppression_budget, Predicate};
