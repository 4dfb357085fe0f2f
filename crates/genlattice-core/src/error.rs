//! Error types for genlattice.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported generalization: rule={rule}, value={value}, level={level}")]
    UnsupportedGeneralization {
        rule: String,
        value: String,
        level: u32,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Metric error: {0}")]
    Metric(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a rule that cannot handle `value` at `level`.
    pub fn unsupported(rule: &str, value: impl std::fmt::Display, level: u32) -> Self {
        Self::UnsupportedGeneralization {
            rule: rule.to_string(),
            value: value.to_string(),
            level,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
