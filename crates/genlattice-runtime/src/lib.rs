//! Runtime orchestrator: validated configuration, timed runs, run reports.
//!
//! Provides the high-level verbs (ola, inverse_ola, epsilon_safe, m_concealing)
//! on top of the search, dp and risk crates.

pub mod config;
pub mod orchestrator;
pub mod types;

pub use config::{AnonymizerConfig, DpConfig, RiskConfig, SearchConfig};
pub use orchestrator::Anonymizer;
pub use types::*;

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, `info` by default.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
