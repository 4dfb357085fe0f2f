//! Dominance over the lattice is a strict partial order.

use genlattice_core::{Record, Value};
use genlattice_lattice::{Lattice, Predicate, TagDirection};
use genlattice_rules::{catalogue, GenState, RuleSet};
use proptest::prelude::*;

fn rules() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.insert(0, catalogue::age());
    rules.insert(1, catalogue::country());
    rules.insert(2, catalogue::gender());
    rules
}

fn state() -> impl Strategy<Value = GenState> {
    (0u32..=3, 0u32..=3, 0u32..=1).prop_map(|(a, c, g)| GenState::from_levels([(0, a), (1, c), (2, g)]))
}

proptest! {
    #[test]
    fn test_dominance_is_strict_partial_order(x in state(), y in state(), z in state()) {
        let rules = rules();
        let records: Vec<Record> = vec![vec![Value::Int(40), Value::from("Peru"), Value::from("Male")]];
        let predicate = Predicate::KAnonymous { k: 1, max_sup: 0.0 };
        let mut lattice = Lattice::build_network(&rules, &records, predicate, TagDirection::Upward);
        let (a, b, c) = (lattice.node_for(x), lattice.node_for(y), lattice.node_for(z));

        prop_assert!(!lattice.dominates(a, a));
        prop_assert!(!(lattice.dominates(a, b) && lattice.dominates(b, a)));
        if lattice.dominates(a, b) && lattice.dominates(b, c) {
            prop_assert!(lattice.dominates(a, c));
        }
    }

    #[test]
    fn test_dominance_matches_reachability(x in state(), y in state()) {
        let rules = rules();
        let records: Vec<Record> = Vec::new();
        let predicate = Predicate::KAnonymous { k: 1, max_sup: 0.0 };
        let mut lattice = Lattice::build_network(&rules, &records, predicate, TagDirection::Upward);
        let (a, b) = (lattice.node_for(x), lattice.node_for(y));

        let reachable = a != b && lattice.layers(a, b).iter().flatten().any(|&n| n == b);
        prop_assert_eq!(lattice.dominates(a, b), reachable);
    }
}
