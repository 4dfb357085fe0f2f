//! OLA and Inverse-OLA against exhaustive enumeration of a small lattice.

use genlattice_core::{Record, Value};
use genlattice_lattice::{is_k_anonymous, Lattice, Predicate, TagDirection};
use genlattice_metrics::{InfoLossMetric, MetricInput};
use genlattice_rules::{apply_gen, catalogue, GenState, RuleSet};
use genlattice_search::{info_loss_maximal, k_minimal, run_inverse_ola, run_ola};
use serde_json::json;

fn rules() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.insert(0, catalogue::age());
    rules.insert(1, catalogue::gender());
    rules.insert(2, catalogue::country());
    rules
}

fn records() -> Vec<Record> {
    [
        (23, "Male", "Peru"),
        (27, "Male", "Mexico"),
        (24, "Female", "Canada"),
        (29, "Female", "United-States"),
        (35, "Male", "Germany"),
        (36, "Male", "France"),
        (38, "Female", "Italy"),
        (31, "Female", "Greece"),
        (52, "Male", "China"),
        (57, "Female", "Japan"),
        (64, "Male", "India"),
        (61, "Female", "Iran"),
    ]
    .iter()
    .map(|&(age, gender, country)| vec![Value::Int(age), Value::from(gender), Value::from(country), Value::from("x")])
    .collect()
}

fn all_states(rules: &RuleSet, records: &[Record]) -> Vec<GenState> {
    let mut lattice = Lattice::build_network(
        rules,
        records,
        Predicate::KAnonymous { k: 1, max_sup: 0.0 },
        TagDirection::Upward,
    );
    let nodes = lattice.all_nodes();
    nodes.into_iter().map(|n| lattice.state(n).clone()).collect()
}

fn brute_force_k_minimal(rules: &RuleSet, records: &[Record], k: usize, max_sup: f64) -> Vec<GenState> {
    let columns: Vec<usize> = rules.keys().copied().collect();
    let suitable: Vec<GenState> = all_states(rules, records)
        .into_iter()
        .filter(|s| is_k_anonymous(&apply_gen(records, s, rules).unwrap(), &columns, k, max_sup))
        .collect();
    let mut minimal: Vec<GenState> = suitable
        .iter()
        .filter(|s| !suitable.iter().any(|o| o.precedes(s)))
        .cloned()
        .collect();
    minimal.sort();
    minimal
}

#[test]
fn test_k_minimal_matches_exhaustive_search() {
    let rules = rules();
    let records = records();
    for (k, max_sup) in [(2, 0.0), (3, 0.0), (4, 10.0), (6, 0.0), (2, 20.0)] {
        let mut lattice = Lattice::build_network(
            &rules,
            &records,
            Predicate::KAnonymous { k, max_sup },
            TagDirection::Upward,
        );
        let frontier = k_minimal(&mut lattice).unwrap();
        assert_eq!(
            frontier.states(&lattice),
            brute_force_k_minimal(&rules, &records, k, max_sup),
            "k={} max_sup={}",
            k,
            max_sup
        );

        let counters = lattice.counters();
        assert!(counters.checked <= 32);
        assert!(counters.suitable + counters.not_suitable <= 32);
    }
}

#[test]
fn test_info_loss_maximal_matches_exhaustive_search() {
    let rules = rules();
    let records = records();
    for max_loss in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let metric = InfoLossMetric::NormPrec;
        let mut lattice = Lattice::build_network(
            &rules,
            &records,
            Predicate::InfoLossBound {
                metric: metric.clone(),
                max_loss,
            },
            TagDirection::Downward,
        );
        let frontier = info_loss_maximal(&mut lattice).unwrap();

        let within: Vec<GenState> = all_states(&rules, &records)
            .into_iter()
            .filter(|s| {
                let input = MetricInput {
                    rules: &rules,
                    state: s,
                    original: &records,
                    release: None,
                };
                metric.compute(&input).unwrap() <= max_loss
            })
            .collect();
        let mut maximal: Vec<GenState> = within
            .iter()
            .filter(|s| !within.iter().any(|o| s.precedes(o)))
            .cloned()
            .collect();
        maximal.sort();

        assert_eq!(frontier.states(&lattice), maximal, "max_loss={}", max_loss);
    }
}

#[test]
fn test_predictive_tagging_saves_evaluations() {
    let rules = rules();
    let records = records();
    let mut lattice = Lattice::build_network(
        &rules,
        &records,
        Predicate::KAnonymous { k: 2, max_sup: 0.0 },
        TagDirection::Upward,
    );
    k_minimal(&mut lattice).unwrap();
    let counters = lattice.counters();
    assert!(counters.checked < lattice.node_count() as u64);
    // every evaluation produced a fresh tag
    assert!(counters.suitable + counters.not_suitable >= counters.checked);
}

#[test]
fn test_run_ola_reports() {
    let rules = rules();
    let records = records();
    let outcome = run_ola(&records, &rules, 2, 0.0, &InfoLossMetric::NormPrec)
        .unwrap()
        .unwrap();

    assert!(outcome.release.stats.suppressed_records == 0);
    assert_eq!(outcome.release.records.len(), records.len());
    assert!(brute_force_k_minimal(&rules, &records, 2, 0.0).contains(&outcome.state));

    let stats = &outcome.stats;
    assert_eq!(stats.get_in("params", "k"), Some(&json!(2)));
    assert_eq!(stats.get_in("params", "loss_metric"), Some(&json!("NormPrec")));
    assert_eq!(
        stats.get_in("params", "generalization_rules"),
        Some(&json!({"0": 3, "1": 1, "2": 3}))
    );
    assert_eq!(stats.get_in("results", "node"), Some(&json!(outcome.state.to_string())));
    assert_eq!(stats.get_in("results", "suppressed_records"), Some(&json!(0)));
    assert_eq!(
        stats.get_in("results", "checked_nodes"),
        Some(&json!(outcome.counters.checked))
    );
}

#[test]
fn test_run_ola_with_release_metric() {
    let rules = rules();
    let records = records();
    let outcome = run_ola(&records, &rules, 3, 0.0, &InfoLossMetric::DmStar)
        .unwrap()
        .unwrap();
    let columns: Vec<usize> = rules.keys().copied().collect();
    assert!(is_k_anonymous(&outcome.release.records, &columns, 3, 0.0));
}

#[test]
fn test_run_ola_no_strategy() {
    let rules = rules();
    let records = records();
    let outcome = run_ola(&records, &rules, 50, 0.0, &InfoLossMetric::NormPrec).unwrap();
    assert!(outcome.is_none());
}

#[test]
fn test_run_inverse_ola() {
    let rules = rules();
    let records = records();
    let outcome = run_inverse_ola(&records, &rules, 0.5, 0.0, &InfoLossMetric::NormPrec)
        .unwrap()
        .unwrap();
    assert!(outcome.k >= 1);
    assert_eq!(outcome.release.stats.suppressed_records, 0);
    assert_eq!(outcome.stats.get_in("results", "k"), Some(&json!(outcome.k)));
    assert_eq!(outcome.stats.get_in("params", "max_loss"), Some(&json!(0.5)));

    let bottom_only = run_inverse_ola(&records, &rules, 0.0, 0.0, &InfoLossMetric::NormPrec)
        .unwrap()
        .unwrap();
    assert_eq!(bottom_only.state, GenState::bottom(&rules));
    assert_eq!(bottom_only.k, 1);
}
