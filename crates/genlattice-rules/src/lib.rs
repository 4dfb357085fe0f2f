//! Generalization rules: the per-column catalogue, lattice points and record transforms.
//!
//! A [`RuleSet`] maps every protected column to a [`GeneralizationRule`]; a
//! [`GenState`] picks one level per column; [`apply_gen`] materializes the
//! generalized records for a state.

pub mod catalogue;
pub mod rule;
pub mod state;
pub mod transform;

pub use rule::{protected_columns, Bands, GeneralizationRule, Hierarchy, RangeBuckets, RuleSet};
pub use state::GenState;
pub use transform::apply_gen;
