//! Precision loss with an additive penalty, used to score nodes for sampling.

use genlattice_core::Result;
use genlattice_rules::{GenState, RuleSet};
use serde::{Deserialize, Serialize};

use crate::loss::norm_prec;

/// `NormPrec + penalty_factor * min(penalty, max_penalty)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenalizedPrec {
    pub penalty_factor: f64,
    pub max_penalty: f64,
}

impl PenalizedPrec {
    pub const NAME: &'static str = "PenaltyPrec";

    pub fn new(penalty_factor: f64, max_penalty: f64) -> Self {
        Self {
            penalty_factor,
            max_penalty,
        }
    }

    pub fn compute(&self, rules: &RuleSet, state: &GenState, penalty: f64) -> Result<f64> {
        let penalty = penalty.min(self.max_penalty);
        Ok(norm_prec(rules, state)? + self.penalty_factor * penalty)
    }
}
