//! Attacker knowledge states and their probabilities.

use std::collections::BTreeMap;

use genlattice_core::{Error, Result};

/// One flag per column: whether the attacker knows it.
pub type KnowledgeState = Vec<bool>;

/// Every combination of known sensitive columns, protected columns always known.
///
/// States are ordered as a boolean product over `sensitive` with `true` first,
/// the first sensitive column varying slowest. Fails when the number of
/// combinations does not fit in a `usize`.
pub fn knowledge_states(
    n_columns: usize,
    protected: &[usize],
    sensitive: &[usize],
) -> Result<Vec<KnowledgeState>> {
    let mut base = vec![false; n_columns];
    for &c in protected {
        if let Some(known) = base.get_mut(c) {
            *known = true;
        }
    }

    let combinations = u32::try_from(sensitive.len())
        .ok()
        .and_then(|n| 1usize.checked_shl(n))
        .ok_or_else(|| {
            Error::InvalidParameter(format!(
                "{} sensitive columns give too many knowledge states",
                sensitive.len()
            ))
        })?;
    Ok((0..combinations)
        .map(|i| {
            let mut state = base.clone();
            for (j, &c) in sensitive.iter().enumerate() {
                // bit clear means known, so the all-known state comes first
                let shift = sensitive.len() - 1 - j;
                if let Some(known) = state.get_mut(c) {
                    *known = (i >> shift) & 1 == 0;
                }
            }
            state
        })
        .collect())
}

/// Indices of the known columns, ascending.
pub fn known_columns(state: &[bool]) -> Vec<usize> {
    state
        .iter()
        .enumerate()
        .filter(|(_, &known)| known)
        .map(|(i, _)| i)
        .collect()
}

/// Per-column probability of being known: 1 for protected columns, the given
/// probability for sensitive ones, 0 otherwise.
pub fn knowing_probabilities(
    n_columns: usize,
    protected: &[usize],
    probs_knowing_sa: &BTreeMap<usize, f64>,
) -> Vec<f64> {
    let mut probs = vec![0.0; n_columns];
    for &c in protected {
        if let Some(p) = probs.get_mut(c) {
            *p = 1.0;
        }
    }
    for (&c, &p) in probs_knowing_sa {
        if let Some(slot) = probs.get_mut(c) {
            *slot = p;
        }
    }
    probs
}

/// Probability of exactly this knowledge state.
pub fn p_knowledge_state(state: &[bool], probs_knowing: &[f64]) -> f64 {
    state
        .iter()
        .zip(probs_knowing)
        .map(|(&known, &p)| if known { p } else { 1.0 - p })
        .product()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_states_order() {
        let states = knowledge_states(5, &[2, 3], &[1, 4]).unwrap();
        assert_eq!(
            states,
            vec![
                vec![false, true, true, true, true],
                vec![false, true, true, true, false],
                vec![false, false, true, true, true],
                vec![false, false, true, true, false],
            ]
        );
    }

    #[test]
    fn test_no_sensitive_columns() {
        let states = knowledge_states(3, &[0], &[]).unwrap();
        assert_eq!(states, vec![vec![true, false, false]]);
    }

    #[test]
    fn test_p_knowledge_state() {
        let state = [false, false, true, true, true];
        let probs = [0.0, 0.01, 1.0, 1.0, 0.2];
        assert!((p_knowledge_state(&state, &probs) - 0.198).abs() < 1e-12);
    }

    #[test]
    fn test_knowing_probabilities() {
        let sa = BTreeMap::from([(1, 0.4), (4, 0.01)]);
        assert_eq!(knowing_probabilities(5, &[2, 3], &sa), vec![0.0, 0.4, 1.0, 1.0, 0.01]);
    }

    #[test]
    fn test_too_many_sensitive_columns() {
        let sensitive: Vec<usize> = (1..=64).collect();
        let err = knowledge_states(65, &[0], &sensitive).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
        assert_eq!(knowledge_states(65, &[0], &sensitive[..3]).unwrap().len(), 8);
    }

    #[test]
    fn test_known_columns() {
        assert_eq!(known_columns(&[false, false, true, true, true]), vec![2, 3, 4]);
    }

    #[test]
    fn test_state_probabilities_sum_to_one() {
        let sa = BTreeMap::from([(1, 0.3), (2, 0.7), (3, 0.5)]);
        let probs = knowing_probabilities(4, &[0], &sa);
        let total: f64 = knowledge_states(4, &[0], &[1, 2, 3])
            .unwrap()
            .iter()
            .map(|s| p_knowledge_state(s, &probs))
            .sum();
        assert!((total - 1.0).abs() < 1e-12);
    }
}
