//! genlattice core: record model, equivalence classes, errors and run statistics.

pub mod error;
pub mod record;
pub mod stats;

pub use error::{Error, Result};
pub use record::{
    equivalence_class_sizes, group_by_columns, project, round_to, Record, Signature, Value,
};
pub use stats::StatsRecord;
