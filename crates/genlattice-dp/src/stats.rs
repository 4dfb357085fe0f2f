//! Summary of what the mechanism is expected to release.

use serde::{Deserialize, Serialize};

use crate::distribution::LatticeDistribution;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputStats {
    /// Probability-weighted info loss.
    pub expected_info_loss: f64,
    pub min_suppression: f64,
    pub max_suppression: f64,
    /// Probability-weighted suppression.
    pub expected_suppression: f64,
    /// Mean suppression when every node is equally likely.
    pub baseline_suppression: f64,
    /// Probability of drawing a node within both bounds.
    pub good_nodes_probability: f64,
    /// Fraction of nodes within both bounds.
    pub baseline_good_nodes: f64,
}

/// A node is good when its suppression is at most `max_sup` and its info loss
/// at most `max_info_loss`.
pub fn output_stats(dist: &LatticeDistribution, max_sup: f64, max_info_loss: f64) -> OutputStats {
    if dist.is_empty() {
        return OutputStats::default();
    }

    let mut stats = OutputStats {
        min_suppression: f64::INFINITY,
        max_suppression: f64::NEG_INFINITY,
        ..OutputStats::default()
    };
    let mut good = 0usize;
    for node in dist.iter() {
        stats.expected_info_loss += node.probability * node.info_loss;
        stats.expected_suppression += node.probability * node.suppression;
        stats.baseline_suppression += node.suppression;
        stats.min_suppression = stats.min_suppression.min(node.suppression);
        stats.max_suppression = stats.max_suppression.max(node.suppression);

        if node.suppression <= max_sup && node.info_loss <= max_info_loss {
            good += 1;
            stats.good_nodes_probability += node.probability;
        }
    }

    let n = dist.len() as f64;
    stats.baseline_suppression /= n;
    stats.baseline_good_nodes = good as f64 / n;
    stats
}
