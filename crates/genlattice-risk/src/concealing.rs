//! The m-concealing measure.

use std::collections::{BTreeMap, HashMap};

use genlattice_core::{
    equivalence_class_sizes, project, round_to, Error, Record, Result, Signature, StatsRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::knowledge::{
    known_columns, knowing_probabilities, knowledge_states, p_knowledge_state, KnowledgeState,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    /// Highest expected re-identification probability of any record.
    pub max_reid_probability: f64,
    /// `1 / max_reid_probability`: the release conceals every record among at least m.
    pub m: f64,
    /// (record, knowledge state) pairs in which the record is alone in its class.
    pub unique_pairs: usize,
    pub knowledge_states: usize,
    pub stats: StatsRecord,
}

/// Class sizes of `records` under each knowledge state, keyed by the known
/// values. The result is aligned with `states`.
pub fn group_release(records: &[Record], states: &[KnowledgeState]) -> Vec<HashMap<Signature, usize>> {
    states
        .iter()
        .map(|state| equivalence_class_sizes(records, &known_columns(state)))
        .collect()
}

/// Chance that `record` is picked out of its class under `state`, given it is
/// included in the release with probability `p_inclusion`.
pub fn p_reid_in_state(
    record: &Record,
    p_inclusion: f64,
    classes: &HashMap<Signature, usize>,
    state: &[bool],
) -> f64 {
    match classes.get(&project(record, &known_columns(state))) {
        Some(&crowd) if crowd > 0 => p_inclusion / crowd as f64,
        _ => 0.0,
    }
}

/// m-concealing of `release`.
///
/// `protected` columns are always known to the attacker; each column in
/// `probs_knowing_sa` is known with its probability; every other column is
/// never known.
pub fn m_concealing(
    release: &[Record],
    prob_inclusion: f64,
    probs_knowing_sa: &BTreeMap<usize, f64>,
    protected: &[usize],
) -> Result<RiskReport> {
    let n_columns = match release.first() {
        Some(r) => r.len(),
        None => return Err(Error::InvalidParameter("m-concealing of an empty release".into())),
    };
    check_probability("prob_inclusion", prob_inclusion)?;
    for (&c, &p) in probs_knowing_sa {
        check_probability(&format!("probs_knowing_sa[{}]", c), p)?;
        check_column(c, n_columns)?;
    }
    for &c in protected {
        check_column(c, n_columns)?;
    }

    let sensitive: Vec<usize> = probs_knowing_sa.keys().copied().collect();
    let states = knowledge_states(n_columns, protected, &sensitive)?;
    info!(
        "m-concealing over {} records and {} knowledge states",
        release.len(),
        states.len()
    );
    let grouped = group_release(release, &states);
    let probs = knowing_probabilities(n_columns, protected, probs_knowing_sa);
    let state_probs: Vec<f64> = states.iter().map(|s| p_knowledge_state(s, &probs)).collect();

    let mut max_reid: f64 = 0.0;
    let mut unique_pairs = 0;
    for record in release {
        let mut expected = 0.0;
        for ((state, classes), p_state) in states.iter().zip(&grouped).zip(&state_probs) {
            if classes.get(&project(record, &known_columns(state))) == Some(&1) {
                unique_pairs += 1;
            }
            expected += p_state * p_reid_in_state(record, prob_inclusion, classes, state);
        }
        max_reid = max_reid.max(expected);
    }

    let m = if max_reid > 0.0 { 1.0 / max_reid } else { f64::INFINITY };
    debug!("max re-identification probability {}, {} unique pairs", max_reid, unique_pairs);

    let stats = StatsRecord::from_sections(
        json!({
            "prob_inclusion": prob_inclusion,
            "probs_knowing_sa": probs_knowing_sa
                .iter()
                .map(|(c, p)| (c.to_string(), *p))
                .collect::<BTreeMap<String, f64>>(),
        }),
        json!({
            "m": round_to(m, 4),
            "max_reid_probability": round_to(max_reid, 4),
            "unique_pairs": unique_pairs,
        }),
    )?;

    Ok(RiskReport {
        max_reid_probability: max_reid,
        m,
        unique_pairs,
        knowledge_states: states.len(),
        stats,
    })
}

fn check_probability(name: &str, p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!("{} = {} is not a probability", name, p)))
    }
}

fn check_column(column: usize, n_columns: usize) -> Result<()> {
    if column < n_columns {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "column {} outside a {}-column release",
            column, n_columns
        )))
    }
}
