//! Runtime types.

use genlattice_core::StatsRecord;
use genlattice_dp::{LatticeDistribution, OutputStats};
use serde::Serialize;

/// Verb that produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    /// Least-loss k-anonymous release.
    Ola,
    /// Largest-k release within an information-loss bound.
    InverseOla,
    /// Exponential-mechanism distribution over the lattice.
    EpsilonSafe,
    /// Re-identification risk of a release.
    MConcealing,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ola => "ola",
            Self::InverseOla => "inverse_ola",
            Self::EpsilonSafe => "epsilon_safe",
            Self::MConcealing => "m_concealing",
        }
    }
}

/// Result of one verb together with its statistics.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<T> {
    #[serde(rename = "runId")]
    pub run_id: String,
    /// RFC 3339, UTC.
    #[serde(rename = "generatedAt")]
    pub generated_at: String,
    pub verb: Verb,
    pub outcome: T,
    /// `params`, `results` and `runtime.<verb>` in seconds.
    pub stats: StatsRecord,
}

impl<T> RunReport<T> {
    /// Seconds spent in the verb, as recorded in the stats.
    pub fn elapsed_secs(&self) -> Option<f64> {
        self.stats
            .get_in("runtime", self.verb.as_str())
            .and_then(|v| v.as_f64())
    }
}

/// Weighted lattice plus the expected-output summary for the configured bounds.
#[derive(Debug, Clone, Serialize)]
pub struct EpsilonSafeOutcome {
    pub distribution: LatticeDistribution,
    pub output: OutputStats,
}
