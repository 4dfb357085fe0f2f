//! The whole lattice annotated with k-anonymity, suppression and loss.

use genlattice_core::{Record, Result};
use genlattice_lattice::{k_anonymity_profile, Lattice, Predicate, TagDirection};
use genlattice_metrics::{InfoLossMetric, MetricInput};
use genlattice_rules::{GenState, RuleSet};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionNode {
    pub state: GenState,
    pub k_anonymous: bool,
    /// Percentage of records in classes smaller than k.
    pub suppression: f64,
    /// NormPrec of the state.
    pub info_loss: f64,
    /// `1 / penalized loss`; zero until utilities are computed.
    pub utility: f64,
    /// Sampling probability; zero until utilities are computed.
    pub probability: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatticeDistribution {
    pub nodes: Vec<DistributionNode>,
}

impl LatticeDistribution {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DistributionNode> {
        self.nodes.iter()
    }

    pub fn total_probability(&self) -> f64 {
        self.nodes.iter().map(|n| n.probability).sum()
    }

    pub fn k_anonymous_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.k_anonymous).count()
    }
}

/// Evaluate every node of the lattice over `records`.
pub fn build_distribution(
    rules: &RuleSet,
    records: &[Record],
    k: usize,
    max_sup: f64,
) -> Result<LatticeDistribution> {
    let mut lattice = Lattice::build_network(
        rules,
        records,
        Predicate::KAnonymous { k, max_sup },
        TagDirection::Upward,
    );
    let columns = lattice.columns();
    let nodes = lattice.all_nodes();
    info!("Evaluating {} lattice nodes", nodes.len());

    let mut distribution = LatticeDistribution::default();
    for node in nodes {
        let state = lattice.state(node).clone();
        let info_loss = InfoLossMetric::NormPrec.compute(&MetricInput {
            rules,
            state: &state,
            original: records,
            release: None,
        })?;
        let (k_anonymous, suppression) = k_anonymity_profile(lattice.release(node)?, &columns, k, max_sup);

        distribution.nodes.push(DistributionNode {
            state,
            k_anonymous,
            suppression,
            info_loss,
            utility: 0.0,
            probability: 0.0,
        });
    }

    info!(
        "{} k-anonymous nodes, {} not k-anonymous nodes",
        distribution.k_anonymous_count(),
        distribution.len() - distribution.k_anonymous_count()
    );
    Ok(distribution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use genlattice_core::Value;
    use genlattice_rules::catalogue;

    #[test]
    fn test_build_distribution_covers_lattice() {
        let mut rules = RuleSet::new();
        rules.insert(0, catalogue::gender());
        rules.insert(1, catalogue::suppress());
        let records = vec![
            vec![Value::from("Male"), Value::from("A")],
            vec![Value::from("Male"), Value::from("B")],
            vec![Value::from("Female"), Value::from("A")],
        ];
        let dist = build_distribution(&rules, &records, 2, 0.0).unwrap();
        assert_eq!(dist.len(), 4);

        let bottom = &dist.nodes[0];
        assert_eq!(bottom.state, GenState::bottom(&rules));
        assert!(!bottom.k_anonymous);
        assert_eq!(bottom.suppression, 100.0);
        assert_eq!(bottom.info_loss, 0.0);

        let top = &dist.nodes[3];
        assert!(top.k_anonymous);
        assert_eq!(top.suppression, 0.0);
        assert_eq!(top.info_loss, 1.0);

        // gender kept, column 1 suppressed: the lone female is undersized
        let gender_only = dist
            .iter()
            .find(|n| n.state == GenState::from_levels([(0, 0), (1, 1)]))
            .unwrap();
        assert!(!gender_only.k_anonymous);
        assert!((gender_only.suppression - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(dist.k_anonymous_count(), 1);
    }
}
