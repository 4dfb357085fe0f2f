//! The shared bisection over lattice heights.

use genlattice_core::{Error, Result};
use genlattice_lattice::{Lattice, NodeId, TagDirection};
use tracing::{debug, info};

use crate::frontier::Frontier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    /// Suitable nodes lie towards the top; collect the lowest.
    Ola,
    /// Suitable nodes lie towards the bottom; collect the highest.
    InverseOla,
}

/// All minimal nodes satisfying an upward-closed predicate (k-anonymity).
pub fn k_minimal(lattice: &mut Lattice<'_>) -> Result<Frontier> {
    expect_direction(lattice, TagDirection::Upward)?;
    info!("Searching lattice");
    let mut frontier = Frontier::minimal();
    let (b, t) = (lattice.bottom(), lattice.top());
    bisect(lattice, b, t, Orientation::Ola, &mut frontier)?;
    Ok(frontier)
}

/// All maximal nodes satisfying a downward-closed predicate (information-loss bound).
pub fn info_loss_maximal(lattice: &mut Lattice<'_>) -> Result<Frontier> {
    expect_direction(lattice, TagDirection::Downward)?;
    info!("Searching lattice");
    let mut frontier = Frontier::maximal();
    let (b, t) = (lattice.bottom(), lattice.top());
    bisect(lattice, b, t, Orientation::InverseOla, &mut frontier)?;
    Ok(frontier)
}

fn expect_direction(lattice: &Lattice<'_>, direction: TagDirection) -> Result<()> {
    if lattice.direction() != direction {
        return Err(Error::InvalidParameter(format!(
            "search needs a lattice tagged {:?}, got {:?}",
            direction,
            lattice.direction()
        )));
    }
    Ok(())
}

fn bisect(
    lattice: &mut Lattice<'_>,
    b: NodeId,
    t: NodeId,
    orientation: Orientation,
    frontier: &mut Frontier,
) -> Result<()> {
    let layers = lattice.layers(b, t);
    let h = layers.len();

    if h > 2 {
        for &n in &layers[h / 2] {
            let suitable = resolve(lattice, n)?;
            let (low, high) = match (orientation, suitable) {
                (Orientation::Ola, true) | (Orientation::InverseOla, false) => (b, n),
                (Orientation::Ola, false) | (Orientation::InverseOla, true) => (n, t),
            };
            bisect(lattice, low, high, orientation, frontier)?;
        }
        return Ok(());
    }

    // two adjacent nodes (or one): settle the extreme nearest the expected
    // frontier first, then the candidate it points to
    let (first, other) = match orientation {
        Orientation::Ola => (b, t),
        Orientation::InverseOla => (t, b),
    };
    let candidate = if resolve(lattice, first)? { first } else { other };
    if resolve(lattice, candidate)? && frontier.insert(lattice, candidate) {
        debug!("frontier += {}", lattice.state(candidate));
    }
    Ok(())
}

/// Tag of `n`, evaluating and tagging it first if it has none.
fn resolve(lattice: &mut Lattice<'_>, n: NodeId) -> Result<bool> {
    lattice.visit();
    if let Some(tag) = lattice.tag(n) {
        return Ok(tag);
    }
    let suitable = lattice.evaluate(n)?;
    if suitable {
        lattice.tag_suitable(n);
    } else {
        lattice.tag_not_suitable(n);
    }
    Ok(suitable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use genlattice_core::{Record, Value};
    use genlattice_lattice::Predicate;
    use genlattice_metrics::InfoLossMetric;
    use genlattice_rules::{catalogue, GenState, RuleSet};

    fn rules() -> RuleSet {
        let mut rules = RuleSet::new();
        rules.insert(0, catalogue::gender());
        rules.insert(1, catalogue::suppress());
        rules
    }

    fn records() -> Vec<Record> {
        vec![
            vec![Value::from("Male"), Value::from("A")],
            vec![Value::from("Male"), Value::from("B")],
            vec![Value::from("Female"), Value::from("A")],
            vec![Value::from("Female"), Value::from("B")],
        ]
    }

    #[test]
    fn test_two_level_lattice_k_minimal() {
        let rules = rules();
        let records = records();
        let mut lattice = Lattice::build_network(
            &rules,
            &records,
            Predicate::KAnonymous { k: 2, max_sup: 0.0 },
            TagDirection::Upward,
        );
        let frontier = k_minimal(&mut lattice).unwrap();
        assert_eq!(
            frontier.states(&lattice),
            vec![
                GenState::from_levels([(0, 0), (1, 1)]),
                GenState::from_levels([(0, 1), (1, 0)]),
            ]
        );
        let counters = lattice.counters();
        // bottom plus the two middle nodes
        assert_eq!(counters.checked, 3);
        assert!(counters.visited >= counters.checked);
    }

    #[test]
    fn test_bottom_already_suitable() {
        let rules = rules();
        let records = records();
        let mut lattice = Lattice::build_network(
            &rules,
            &records,
            Predicate::KAnonymous { k: 1, max_sup: 0.0 },
            TagDirection::Upward,
        );
        let frontier = k_minimal(&mut lattice).unwrap();
        assert_eq!(frontier.states(&lattice), vec![GenState::bottom(&rules)]);
    }

    #[test]
    fn test_nothing_suitable() {
        let rules = rules();
        let records = records();
        // more than the record count: even the top node fails
        let mut lattice = Lattice::build_network(
            &rules,
            &records,
            Predicate::KAnonymous { k: 5, max_sup: 0.0 },
            TagDirection::Upward,
        );
        assert!(k_minimal(&mut lattice).unwrap().is_empty());
    }

    #[test]
    fn test_info_loss_maximal() {
        let rules = rules();
        let records = records();
        let mut lattice = Lattice::build_network(
            &rules,
            &records,
            Predicate::InfoLossBound {
                metric: InfoLossMetric::NormPrec,
                max_loss: 0.5,
            },
            TagDirection::Downward,
        );
        let frontier = info_loss_maximal(&mut lattice).unwrap();
        assert_eq!(frontier.len(), 2);
        for state in frontier.states(&lattice) {
            assert_eq!(state.height(), 1);
        }
    }

    #[test]
    fn test_direction_mismatch() {
        let rules = rules();
        let records = records();
        let mut lattice = Lattice::build_network(
            &rules,
            &records,
            Predicate::KAnonymous { k: 2, max_sup: 0.0 },
            TagDirection::Downward,
        );
        assert!(matches!(k_minimal(&mut lattice), Err(Error::InvalidParameter(_))));
    }
}
