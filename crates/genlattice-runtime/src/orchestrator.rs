//! Anonymizer: runs the verbs with one validated configuration.

use std::time::Instant;

use genlattice_core::{Record, Result, StatsRecord};
use genlattice_dp::{epsilon_safe_ola, output_stats, parameters, DpParameters};
use genlattice_risk::{m_concealing, RiskReport};
use genlattice_rules::{protected_columns, RuleSet};
use genlattice_search::{run_inverse_ola, run_ola, InverseOlaOutcome, OlaOutcome};
use serde_json::json;
use tracing::info;

use crate::config::AnonymizerConfig;
use crate::types::*;

/// Top-level entry point tying search, sampling and risk together.
pub struct Anonymizer {
    config: AnonymizerConfig,
}

impl Anonymizer {
    /// Create an anonymizer, rejecting an invalid configuration.
    pub fn new(config: AnonymizerConfig) -> Result<Self> {
        config.validate()?;
        info!(
            "Anonymizer initialized: k={}, max_sup={}, metric={}, epsilon={}",
            config.search.k, config.search.max_sup, config.search.metric, config.dp.epsilon
        );
        Ok(Self { config })
    }

    /// Create from defaults and `GENLATTICE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(AnonymizerConfig::from_env())
    }

    pub fn config(&self) -> &AnonymizerConfig {
        &self.config
    }

    /// Verb `ola`: least-loss k-anonymous release.
    pub fn ola(&self, records: &[Record], rules: &RuleSet) -> Result<RunReport<Option<OlaOutcome>>> {
        let search = &self.config.search;
        timed(Verb::Ola, || {
            let outcome = run_ola(records, rules, search.k, search.max_sup, &search.metric)?;
            let stats = outcome.as_ref().map(|o| o.stats.clone()).unwrap_or_default();
            Ok((outcome, stats))
        })
    }

    /// Verb `inverse_ola`: largest-k release within the loss bound.
    pub fn inverse_ola(
        &self,
        records: &[Record],
        rules: &RuleSet,
    ) -> Result<RunReport<Option<InverseOlaOutcome>>> {
        let search = &self.config.search;
        timed(Verb::InverseOla, || {
            let outcome = run_inverse_ola(records, rules, search.max_loss, search.max_sup, &search.metric)?;
            let stats = outcome.as_ref().map(|o| o.stats.clone()).unwrap_or_default();
            Ok((outcome, stats))
        })
    }

    /// Verb `epsilon_safe`: exponential-mechanism distribution over the whole lattice.
    pub fn epsilon_safe(&self, records: &[Record], rules: &RuleSet) -> Result<RunReport<EpsilonSafeOutcome>> {
        let search = &self.config.search;
        let mechanism = self.config.dp.mechanism();
        timed(Verb::EpsilonSafe, || {
            let (distribution, mut stats) =
                epsilon_safe_ola(records, rules, search.k, search.max_sup, &mechanism)?;
            let output = output_stats(&distribution, search.max_sup, search.max_loss);
            stats.merge(serde_json::from_value(json!({ "results": output }))?);
            Ok((EpsilonSafeOutcome { distribution, output }, stats))
        })
    }

    /// Verb `m_concealing`: risk of a release. The rule set names the protected columns.
    pub fn m_concealing(&self, release: &[Record], rules: &RuleSet) -> Result<RunReport<RiskReport>> {
        let risk = &self.config.risk;
        timed(Verb::MConcealing, || {
            let report = m_concealing(
                release,
                risk.prob_inclusion,
                &risk.probs_knowing_sa,
                &protected_columns(rules),
            )?;
            let stats = report.stats.clone();
            Ok((report, stats))
        })
    }

    /// (epsilon', delta) for sampling records with probability `beta` before
    /// k-anonymizing, using the configured k and epsilon.
    pub fn dp_parameters(&self, beta: f64, population_size: usize) -> Option<DpParameters> {
        parameters(self.config.search.k, beta, self.config.dp.epsilon, population_size)
    }
}

fn timed<T>(verb: Verb, run: impl FnOnce() -> Result<(T, StatsRecord)>) -> Result<RunReport<T>> {
    let started = Instant::now();
    let (outcome, mut stats) = run()?;
    let elapsed = started.elapsed().as_secs_f64();
    info!("{} finished in {:.3}s", verb.as_str(), elapsed);

    if let Some(runtime) = stats.section("runtime") {
        runtime.entry(verb.as_str()).or_insert(json!(elapsed));
    }

    Ok(RunReport {
        run_id: uuid::Uuid::new_v4().to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        verb,
        outcome,
        stats,
    })
}
