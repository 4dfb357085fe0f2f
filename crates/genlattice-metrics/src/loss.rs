use std::collections::HashMap;
use std::fmt;

use genlattice_core::{equivalence_class_sizes, Error, Record, Result, Value};
use genlattice_rules::{protected_columns, GenState, RuleSet};
use serde::{Deserialize, Serialize};

/// Everything a metric may look at for one lattice node.
#[derive(Debug, Clone, Copy)]
pub struct MetricInput<'a> {
    pub rules: &'a RuleSet,
    pub state: &'a GenState,
    pub original: &'a [Record],
    /// Generalized records for `state`, before suppression. Required when
    /// [`InfoLossMetric::needs_release`] is true.
    pub release: Option<&'a [Record]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InfoLossMetric {
    /// Sum over columns of `level / max_level`.
    Prec,
    /// `Prec` divided by the number of protected columns.
    NormPrec,
    /// `NormPrec` with one weight per protected column, ascending column order.
    /// An empty vector weighs every column equally.
    WeightedNormPrec(Vec<f64>),
    /// Discernibility: sum of squared equivalence class sizes.
    #[serde(rename = "DM*")]
    DmStar,
    /// Non-uniform entropy of the release with respect to the original.
    Entropy,
}

impl Default for InfoLossMetric {
    fn default() -> Self {
        Self::NormPrec
    }
}

impl InfoLossMetric {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Prec => "Prec",
            Self::NormPrec => "NormPrec",
            Self::WeightedNormPrec(_) => "WeightedNormPrec",
            Self::DmStar => "DM*",
            Self::Entropy => "Entropy",
        }
    }

    /// Parse a metric name as used in configuration. Weighted precision parses
    /// with uniform weights.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "prec" => Some(Self::Prec),
            "normprec" | "norm_prec" => Some(Self::NormPrec),
            "weightednormprec" | "weighted_norm_prec" => Some(Self::WeightedNormPrec(Vec::new())),
            "dm*" | "dm_star" | "dmstar" => Some(Self::DmStar),
            "entropy" => Some(Self::Entropy),
            _ => None,
        }
    }

    pub fn needs_release(&self) -> bool {
        matches!(self, Self::DmStar | Self::Entropy)
    }

    pub fn compute(&self, input: &MetricInput<'_>) -> Result<f64> {
        match self {
            Self::Prec => prec(input.rules, input.state),
            Self::NormPrec => norm_prec(input.rules, input.state),
            Self::WeightedNormPrec(weights) => weighted_norm_prec(input.rules, input.state, weights),
            Self::DmStar => {
                let release = required_release(self, input)?;
                Ok(dm_star(release, &protected_columns(input.rules)))
            }
            Self::Entropy => {
                let release = required_release(self, input)?;
                entropy(input.original, release, &protected_columns(input.rules))
            }
        }
    }
}

impl fmt::Display for InfoLossMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn required_release<'a>(metric: &InfoLossMetric, input: &MetricInput<'a>) -> Result<&'a [Record]> {
    input
        .release
        .ok_or_else(|| Error::Metric(format!("{} needs the generalized records", metric)))
}

/// Per-column `level / max_level`, ascending column order.
fn column_ratios(rules: &RuleSet, state: &GenState) -> Result<Vec<f64>> {
    state
        .iter()
        .map(|(column, level)| {
            let rule = rules
                .get(&column)
                .ok_or_else(|| Error::Config(format!("no generalization rule for column {}", column)))?;
            let max = rule.max_level();
            Ok(if max == 0 { 0.0 } else { level as f64 / max as f64 })
        })
        .collect()
}

pub(crate) fn prec(rules: &RuleSet, state: &GenState) -> Result<f64> {
    Ok(column_ratios(rules, state)?.iter().sum())
}

pub(crate) fn norm_prec(rules: &RuleSet, state: &GenState) -> Result<f64> {
    if rules.is_empty() {
        return Ok(0.0);
    }
    Ok(prec(rules, state)? / rules.len() as f64)
}

fn weighted_norm_prec(rules: &RuleSet, state: &GenState, weights: &[f64]) -> Result<f64> {
    let ratios = column_ratios(rules, state)?;
    if weights.is_empty() {
        return norm_prec(rules, state);
    }
    if weights.len() != ratios.len() {
        return Err(Error::InvalidParameter(format!(
            "expected {} weights, got {}",
            ratios.len(),
            weights.len()
        )));
    }
    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        return Err(Error::InvalidParameter("weights sum to zero".into()));
    }
    let loss: f64 = ratios.iter().zip(weights).map(|(r, w)| r * w).sum();
    Ok(loss / total)
}

fn dm_star(release: &[Record], columns: &[usize]) -> f64 {
    equivalence_class_sizes(release, columns)
        .values()
        .map(|&size| (size * size) as f64)
        .sum()
}

fn entropy(original: &[Record], release: &[Record], columns: &[usize]) -> Result<f64> {
    if original.len() != release.len() {
        return Err(Error::Metric(format!(
            "entropy needs aligned records: {} original, {} released",
            original.len(),
            release.len()
        )));
    }

    let mut summation = 0.0;
    for &column in columns {
        let freq_original = column_frequencies(original, column);
        let freq_release = column_frequencies(release, column);

        for (a, b) in original.iter().zip(release) {
            let a = cell(a, column);
            let b = cell(b, column);
            let fa = freq_original.get(a).copied().unwrap_or(0);
            let fb = freq_release.get(b).copied().unwrap_or(0);
            if fa == 0 || fb == 0 {
                return Err(Error::Metric(format!(
                    "zero frequency for column {} ({} -> {})",
                    column, a, b
                )));
            }
            summation += (fa as f64 / fb as f64).log2();
        }
    }
    Ok(-summation)
}

const MISSING: &Value = &Value::Suppressed;

fn cell(record: &Record, column: usize) -> &Value {
    record.get(column).unwrap_or(MISSING)
}

fn column_frequencies(records: &[Record], column: usize) -> HashMap<&Value, usize> {
    let mut freq = HashMap::new();
    for r in records {
        *freq.entry(cell(r, column)).or_insert(0) += 1;
    }
    freq
}
