//! End-to-end OLA and Inverse-OLA runs: search, choose, release, report.

use std::collections::BTreeMap;

use genlattice_core::{round_to, Record, Result, StatsRecord};
use genlattice_lattice::{Lattice, LatticeCounters, NodeId, Predicate, TagDirection};
use genlattice_metrics::{InfoLossMetric, MetricInput};
use genlattice_rules::{GenState, RuleSet};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::release::{feasible_k, make_release, Release};
use crate::search::{info_loss_maximal, k_minimal};

#[derive(Debug, Clone, Serialize)]
pub struct OlaOutcome {
    pub release: Release,
    pub state: GenState,
    pub info_loss: f64,
    pub counters: LatticeCounters,
    pub stats: StatsRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct InverseOlaOutcome {
    pub release: Release,
    pub state: GenState,
    pub k: usize,
    pub counters: LatticeCounters,
    pub stats: StatsRecord,
}

/// Least-loss k-anonymous generalization of `records`.
///
/// Returns `None` when no node of the lattice is k-anonymous.
pub fn run_ola(
    records: &[Record],
    rules: &RuleSet,
    k: usize,
    max_sup: f64,
    metric: &InfoLossMetric,
) -> Result<Option<OlaOutcome>> {
    let mut lattice = Lattice::build_network(
        rules,
        records,
        Predicate::KAnonymous { k, max_sup },
        TagDirection::Upward,
    );

    let frontier = k_minimal(&mut lattice)?;
    if frontier.is_empty() {
        warn!("No strategy found");
        return Ok(None);
    }

    let counters = lattice.counters();
    info!("visited {} nodes, checked {} nodes", counters.visited, counters.checked);
    info!(
        "{} k-anonymous nodes, {} not k-anonymous nodes",
        counters.suitable, counters.not_suitable
    );

    info!("Choosing strategy among {} k-minimal nodes", frontier.len());
    let mut best: Option<(f64, NodeId)> = None;
    for node in frontier.sorted(&lattice) {
        let loss = node_loss(&mut lattice, node, metric)?;
        if best.map_or(true, |(least, _)| loss < least) {
            best = Some((loss, node));
        }
    }
    let Some((loss, node)) = best else {
        return Ok(None);
    };

    let state = lattice.state(node).clone();
    info!("Generating release with loss {}: {}", loss, state);
    let generalized = lattice.release(node)?.to_vec();
    let release = make_release(generalized, &lattice.columns(), k);

    let mut stats = StatsRecord::from_sections(
        json!({
            "k": k,
            "max_sup": max_sup,
            "loss_metric": metric.name(),
            "generalization_rules": max_levels(rules),
        }),
        &release.stats,
    )?;
    stats.merge(serde_json::from_value(json!({
        "results": {
            "info_loss": round_to(loss, 4),
            "node": state.to_string(),
            "visited_nodes": counters.visited,
            "checked_nodes": counters.checked,
            "k_anonymous_nodes": counters.suitable,
            "not_k_anonymous_nodes": counters.not_suitable,
        }
    }))?);

    Ok(Some(OlaOutcome {
        release,
        state,
        info_loss: loss,
        counters,
        stats,
    }))
}

/// Most general state within `max_loss`, released with the largest k it can reach.
///
/// Returns `None` when even the bottom node exceeds the bound.
pub fn run_inverse_ola(
    records: &[Record],
    rules: &RuleSet,
    max_loss: f64,
    max_sup: f64,
    metric: &InfoLossMetric,
) -> Result<Option<InverseOlaOutcome>> {
    let mut lattice = Lattice::build_network(
        rules,
        records,
        Predicate::InfoLossBound {
            metric: metric.clone(),
            max_loss,
        },
        TagDirection::Downward,
    );

    let frontier = info_loss_maximal(&mut lattice)?;
    if frontier.is_empty() {
        warn!("No strategy found");
        return Ok(None);
    }

    let counters = lattice.counters();
    info!("visited {} nodes, checked {} nodes", counters.visited, counters.checked);
    info!(
        "{} good nodes, {} bad nodes",
        counters.suitable, counters.not_suitable
    );

    info!("Choosing strategy among {} maximal nodes", frontier.len());
    let columns = lattice.columns();
    let mut best: Option<(usize, NodeId)> = None;
    for node in frontier.sorted(&lattice) {
        let k = feasible_k(lattice.release(node)?, &columns, max_sup);
        if best.map_or(true, |(largest, _)| k > largest) {
            best = Some((k, node));
        }
    }
    let Some((k, node)) = best else {
        return Ok(None);
    };

    let state = lattice.state(node).clone();
    info!("Generating release with k {}: {}", k, state);
    let generalized = lattice.release(node)?.to_vec();
    let release = make_release(generalized, &columns, k);

    let mut stats = StatsRecord::from_sections(
        json!({
            "max_loss": max_loss,
            "max_sup": max_sup,
            "loss_metric": metric.name(),
            "generalization_rules": max_levels(rules),
        }),
        &release.stats,
    )?;
    stats.merge(serde_json::from_value(json!({
        "results": {
            "k": k,
            "node": state.to_string(),
            "visited_nodes": counters.visited,
            "checked_nodes": counters.checked,
            "good_info_loss_nodes": counters.suitable,
            "bad_info_loss_nodes": counters.not_suitable,
        }
    }))?);

    Ok(Some(InverseOlaOutcome {
        release,
        state,
        k,
        counters,
        stats,
    }))
}

fn node_loss(lattice: &mut Lattice<'_>, node: NodeId, metric: &InfoLossMetric) -> Result<f64> {
    let rules = lattice.rules();
    let original = lattice.records();
    let state = lattice.state(node).clone();
    let release = if metric.needs_release() {
        Some(lattice.release(node)?)
    } else {
        None
    };
    metric.compute(&MetricInput {
        rules,
        state: &state,
        original,
        release,
    })
}

fn max_levels(rules: &RuleSet) -> BTreeMap<String, u32> {
    rules
        .iter()
        .map(|(column, rule)| (column.to_string(), rule.max_level()))
        .collect()
}
