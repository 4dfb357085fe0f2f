//! (epsilon, delta) guarantee of k-anonymizing a random sample.
//!
//! Sampling each record with probability beta and then applying a k-anonymity
//! algorithm satisfies (epsilon', delta)-differential privacy for the values
//! computed here.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Binomial, DiscreteCDF};

/// Population sizes explored when bounding delta.
const DELTA_TERMS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DpParameters {
    pub epsilon_prime: f64,
    pub delta: f64,
    pub gamma: f64,
    pub n_min: usize,
}

/// Sampling probability that turns `epsilon` into `epsilon_prime`.
pub fn get_beta(epsilon_prime: f64, epsilon: f64) -> f64 {
    1.0 - (epsilon_prime - epsilon).exp()
}

/// `None` when `beta` is not in (0, 1) or the resulting epsilon' is not positive.
pub fn parameters(k: usize, beta: f64, epsilon: f64, population_size: usize) -> Option<DpParameters> {
    if !(beta > 0.0 && beta < 1.0) {
        return None;
    }
    let epsilon_prime = (1.0 - beta).ln() + epsilon;
    if !(epsilon_prime > 0.0) {
        return None;
    }

    let e = (epsilon - epsilon_prime).exp();
    let gamma = (e - 1.0 + beta) / e;
    let n_min = (k as f64 / gamma - 1.0).ceil().max(0.0) as usize;

    let mut delta: f64 = 0.0;
    for n in (n_min..population_size).take(DELTA_TERMS) {
        delta = delta.max(binomial_tail(n, (gamma * n as f64).ceil() as usize, beta)?);
    }

    Some(DpParameters {
        epsilon_prime,
        delta,
        gamma,
        n_min,
    })
}

/// `P[X >= from]` for `X ~ Binomial(n, p)`. `None` when `p` is not a probability.
fn binomial_tail(n: usize, from: usize, p: f64) -> Option<f64> {
    if from == 0 {
        return Some(1.0);
    }
    if from > n {
        return Some(0.0);
    }
    let binomial = Binomial::new(p, n as u64).ok()?;
    Some((1.0 - binomial.cdf(from as u64 - 1)).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infeasible() {
        assert_eq!(parameters(5, 0.0, 1.0, 100), None);
        assert_eq!(parameters(5, 1.0, 1.0, 100), None);
        // ln(0.5) + 0.5 < 0
        assert_eq!(parameters(5, 0.5, 0.5, 100), None);
    }

    #[test]
    fn test_epsilon_prime() {
        let p = parameters(5, 0.1, 1.0, 1000).unwrap();
        assert!((p.epsilon_prime - (0.9f64.ln() + 1.0)).abs() < 1e-12);
        assert!((get_beta(p.epsilon_prime, 1.0) - 0.1).abs() < 1e-12);
        assert!(p.delta >= 0.0 && p.delta <= 1.0);
    }

    #[test]
    fn test_gamma_and_n_min() {
        let p = parameters(10, 0.2, 2.0, 1000).unwrap();
        // epsilon - epsilon' = -ln(0.8)
        let e = 1.0 / 0.8;
        let gamma = (e - 1.0 + 0.2) / e;
        assert!((p.gamma - gamma).abs() < 1e-12);
        assert_eq!(p.n_min, (10.0 / gamma - 1.0f64).ceil() as usize);
    }

    #[test]
    fn test_delta_shrinks_with_k() {
        let small = parameters(2, 0.1, 1.0, 10_000).unwrap();
        let large = parameters(20, 0.1, 1.0, 10_000).unwrap();
        assert!(large.delta < small.delta);
    }

    #[test]
    fn test_population_below_n_min() {
        let p = parameters(50, 0.1, 1.0, 10).unwrap();
        assert_eq!(p.delta, 0.0);
    }

    #[test]
    fn test_binomial_tail() {
        let tail = |n, from, p| binomial_tail(n, from, p).unwrap();
        assert!((tail(0, 0, 0.3) - 1.0).abs() < 1e-12);
        assert!((tail(4, 0, 0.3) - 1.0).abs() < 1e-12);
        assert!((tail(2, 2, 0.5) - 0.25).abs() < 1e-12);
        assert!((tail(3, 2, 0.5) - 0.5).abs() < 1e-12);
        // P[X >= 2], X ~ Binomial(10, 0.1)
        let expected = 1.0 - 0.9f64.powi(10) - 10.0 * 0.1 * 0.9f64.powi(9);
        assert!((tail(10, 2, 0.1) - expected).abs() < 1e-12);
        assert_eq!(tail(3, 4, 0.5), 0.0);
        let t = tail(5000, 600, 0.1);
        assert!(t.is_finite() && t > 0.0 && t < 1.0);
    }

    #[test]
    fn test_binomial_tail_rejects_bad_probability() {
        assert_eq!(binomial_tail(5, 2, 1.5), None);
        assert_eq!(binomial_tail(5, 2, f64::NAN), None);
    }

    #[test]
    fn test_delta_matches_first_term_for_small_k() {
        // k=2, beta=0.1, epsilon=1 gives n_min=10; a population of 11 leaves only n=10
        let p = parameters(2, 0.1, 1.0, 11).unwrap();
        assert_eq!(p.n_min, 10);
        let from = (p.gamma * 10.0).ceil() as usize;
        assert!((p.delta - binomial_tail(10, from, 0.1).unwrap()).abs() < 1e-12);
    }
}
