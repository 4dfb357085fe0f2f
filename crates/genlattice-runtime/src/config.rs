//! Anonymizer configuration, from defaults and `GENLATTICE_*` environment variables.

use std::collections::BTreeMap;
use std::str::FromStr;

use genlattice_core::{Error, Result};
use genlattice_dp::{ExponentialMechanism, PenaltyMode};
use genlattice_metrics::{InfoLossMetric, PenalizedPrec};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub k: usize,
    /// Percentage of records that may be suppressed.
    pub max_sup: f64,
    /// Information-loss bound for Inverse-OLA.
    pub max_loss: f64,
    pub metric: InfoLossMetric,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            k: 5,
            max_sup: 5.0,
            max_loss: 0.5,
            metric: InfoLossMetric::NormPrec,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DpConfig {
    pub epsilon: f64,
    pub penalty_factor: f64,
    pub max_penalty: f64,
    pub sensitivity: f64,
    pub mode: PenaltyMode,
}

impl Default for DpConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.1,
            penalty_factor: 0.05,
            max_penalty: 100.0,
            sensitivity: 1.0,
            mode: PenaltyMode::Suppression,
        }
    }
}

impl DpConfig {
    pub fn mechanism(&self) -> ExponentialMechanism {
        ExponentialMechanism {
            epsilon: self.epsilon,
            sensitivity: self.sensitivity,
            loss: PenalizedPrec::new(self.penalty_factor, self.max_penalty),
            mode: self.mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub prob_inclusion: f64,
    /// Column index -> probability the attacker knows that sensitive column.
    pub probs_knowing_sa: BTreeMap<usize, f64>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            prob_inclusion: 1.0,
            probs_knowing_sa: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnonymizerConfig {
    pub search: SearchConfig,
    pub dp: DpConfig,
    pub risk: RiskConfig,
}

impl AnonymizerConfig {
    /// Defaults overridden by `GENLATTICE_*` environment variables.
    ///
    /// Values that do not parse are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AnonymizerConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|v| parse::<f64>(&v));
        let mut config = Self::default();

        if let Some(k) = lookup("GENLATTICE_K").and_then(|v| parse(&v)) {
            config.search.k = k;
        }
        if let Some(v) = parsed("GENLATTICE_MAX_SUP") {
            config.search.max_sup = v;
        }
        if let Some(v) = parsed("GENLATTICE_MAX_LOSS") {
            config.search.max_loss = v;
        }
        if let Some(metric) = lookup("GENLATTICE_METRIC").and_then(|v| InfoLossMetric::from_name(&v)) {
            config.search.metric = metric;
        }
        if let Some(v) = parsed("GENLATTICE_EPSILON") {
            config.dp.epsilon = v;
        }
        if let Some(v) = parsed("GENLATTICE_PENALTY_FACTOR") {
            config.dp.penalty_factor = v;
        }
        if let Some(v) = parsed("GENLATTICE_MAX_PENALTY") {
            config.dp.max_penalty = v;
        }
        if let Some(v) = parsed("GENLATTICE_SENSITIVITY") {
            config.dp.sensitivity = v;
        }
        if let Some(mode) = lookup("GENLATTICE_PENALTY_MODE").and_then(|v| PenaltyMode::from_name(&v)) {
            config.dp.mode = mode;
        }
        if let Some(v) = parsed("GENLATTICE_PROB_INCLUSION") {
            config.risk.prob_inclusion = v;
        }
        if let Some(probs) = lookup("GENLATTICE_PROBS_KNOWING_SA").and_then(|v| parse_column_probs(&v)) {
            config.risk.probs_knowing_sa = probs;
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::Config(msg));

        if self.search.k == 0 {
            return invalid("k must be at least 1".into());
        }
        if !(0.0..=100.0).contains(&self.search.max_sup) {
            return invalid(format!("max_sup must be a percentage, got {}", self.search.max_sup));
        }
        if !(self.search.max_loss >= 0.0) {
            return invalid(format!("max_loss must be non-negative, got {}", self.search.max_loss));
        }
        if !(self.dp.epsilon > 0.0) {
            return invalid(format!("epsilon must be positive, got {}", self.dp.epsilon));
        }
        if !(self.dp.sensitivity > 0.0) {
            return invalid(format!("sensitivity must be positive, got {}", self.dp.sensitivity));
        }
        if !(self.dp.penalty_factor >= 0.0 && self.dp.max_penalty >= 0.0) {
            return invalid("penalty_factor and max_penalty must be non-negative".into());
        }
        if !(0.0..=1.0).contains(&self.risk.prob_inclusion) {
            return invalid(format!(
                "prob_inclusion must be a probability, got {}",
                self.risk.prob_inclusion
            ));
        }
        for (column, p) in &self.risk.probs_knowing_sa {
            if !(0.0..=1.0).contains(p) {
                return invalid(format!("probability for column {} is {}", column, p));
            }
        }
        Ok(())
    }
}

fn parse<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

/// `"2:0.1,5:0.3"` -> `{2: 0.1, 5: 0.3}`.
fn parse_column_probs(value: &str) -> Option<BTreeMap<usize, f64>> {
    value
        .split(',')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| {
            let (column, p) = pair.split_once(':')?;
            Some((parse(column)?, parse(p)?))
        })
        .collect()
}
