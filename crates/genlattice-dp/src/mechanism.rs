//! Exponential mechanism over the lattice distribution.

use genlattice_core::{Error, Record, Result, StatsRecord};
use genlattice_metrics::PenalizedPrec;
use genlattice_rules::RuleSet;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::distribution::{build_distribution, DistributionNode, LatticeDistribution};

/// What a node is penalized for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyMode {
    /// Penalty is the suppression percentage.
    #[default]
    Suppression,
    /// Penalty is 1 for nodes that are not k-anonymous.
    KAnonymity,
}

impl PenaltyMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "suppression" => Some(Self::Suppression),
            "k_anonymity" | "k-anonymity" | "kanonymity" => Some(Self::KAnonymity),
            _ => None,
        }
    }

    fn penalty(self, node: &DistributionNode) -> f64 {
        match self {
            Self::Suppression => node.suppression,
            Self::KAnonymity => {
                if node.k_anonymous {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialMechanism {
    pub epsilon: f64,
    pub sensitivity: f64,
    pub loss: PenalizedPrec,
    pub mode: PenaltyMode,
}

impl ExponentialMechanism {
    fn validate(&self) -> Result<()> {
        if !(self.epsilon > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if !(self.sensitivity > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "sensitivity must be positive, got {}",
                self.sensitivity
            )));
        }
        Ok(())
    }

    /// Log of the unnormalized weight `exp(epsilon * u / (2 * sensitivity))`.
    fn log_weight(&self, utility: f64) -> f64 {
        self.epsilon * utility / (2.0 * self.sensitivity)
    }
}

/// Set every node's utility (inverse penalized loss) and sampling probability.
///
/// Nodes with zero loss have infinite utility; when there are any, they share
/// the whole probability mass equally.
pub fn compute_utility(
    dist: &mut LatticeDistribution,
    rules: &RuleSet,
    mechanism: &ExponentialMechanism,
) -> Result<()> {
    mechanism.validate()?;

    for node in &mut dist.nodes {
        let penalty = mechanism.mode.penalty(node);
        let loss = mechanism.loss.compute(rules, &node.state, penalty)?;
        node.utility = if loss > 0.0 { 1.0 / loss } else { f64::INFINITY };
    }

    let unbounded = dist.nodes.iter().filter(|n| n.utility.is_infinite()).count();
    if unbounded > 0 {
        debug!("{} nodes with zero loss take all the mass", unbounded);
        let share = 1.0 / unbounded as f64;
        for node in &mut dist.nodes {
            node.probability = if node.utility.is_infinite() { share } else { 0.0 };
        }
        return Ok(());
    }

    // log-sum-exp keeps large epsilon * utility from overflowing
    let log_weights: Vec<f64> = dist.nodes.iter().map(|n| mechanism.log_weight(n.utility)).collect();
    let max = log_weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let total: f64 = log_weights.iter().map(|w| (w - max).exp()).sum();
    for (node, w) in dist.nodes.iter_mut().zip(&log_weights) {
        node.probability = (w - max).exp() / total;
    }
    Ok(())
}

/// Draw one node according to its probability.
pub fn sample<'d, R: Rng + ?Sized>(dist: &'d LatticeDistribution, rng: &mut R) -> Option<&'d DistributionNode> {
    let choice = rng.gen::<f64>() * dist.total_probability();
    let mut accum = 0.0;
    for node in &dist.nodes {
        accum += node.probability;
        if choice < accum {
            return Some(node);
        }
    }
    dist.nodes.iter().rev().find(|n| n.probability > 0.0)
}

/// Build the distribution over the lattice and weight it with the mechanism.
pub fn epsilon_safe_ola(
    records: &[Record],
    rules: &RuleSet,
    k: usize,
    max_sup: f64,
    mechanism: &ExponentialMechanism,
) -> Result<(LatticeDistribution, StatsRecord)> {
    let mut dist = build_distribution(rules, records, k, max_sup)?;
    compute_utility(&mut dist, rules, mechanism)?;
    info!("Weighted {} nodes with epsilon {}", dist.len(), mechanism.epsilon);

    let stats = StatsRecord::from_sections(
        json!({
            "k": k,
            "max_sup": max_sup,
            "epsilon": mechanism.epsilon,
            "sensitivity": mechanism.sensitivity,
            "penalty_factor": mechanism.loss.penalty_factor,
            "max_penalty": mechanism.loss.max_penalty,
            "mode": mechanism.mode,
        }),
        json!({
            "lattice_nodes": dist.len(),
            "k_anonymous_nodes": dist.k_anonymous_count(),
        }),
    )?;
    Ok((dist, stats))
}
