//! Generalization states: one level per protected column.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rule::RuleSet;

/// A point of the generalization lattice, ordered component-wise.
///
/// The derived `Ord` is lexicographic over `(column, level)` pairs and is only
/// used for deterministic iteration; use [`GenState::leq`] for the lattice order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenState(BTreeMap<usize, u32>);

impl GenState {
    /// All columns at level 0.
    pub fn bottom(rules: &RuleSet) -> Self {
        Self(rules.keys().map(|&c| (c, 0)).collect())
    }

    /// All columns at their rule's maximum level.
    pub fn top(rules: &RuleSet) -> Self {
        Self(rules.iter().map(|(&c, r)| (c, r.max_level())).collect())
    }

    pub fn from_levels(levels: impl IntoIterator<Item = (usize, u32)>) -> Self {
        Self(levels.into_iter().collect())
    }

    pub fn level(&self, column: usize) -> u32 {
        self.0.get(&column).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.0.iter().map(|(&c, &l)| (c, l))
    }

    pub fn columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.keys().copied()
    }

    /// Sum of levels.
    pub fn height(&self) -> u32 {
        self.0.values().sum()
    }

    /// States one level higher on exactly one column, bounded by each rule's max.
    pub fn children(&self, rules: &RuleSet) -> Vec<GenState> {
        self.0
            .iter()
            .filter(|&(c, &l)| rules.get(c).map_or(false, |r| l < r.max_level()))
            .map(|(&c, &l)| {
                let mut next = self.clone();
                next.0.insert(c, l + 1);
                next
            })
            .collect()
    }

    /// States one level lower on exactly one column.
    pub fn parents(&self) -> Vec<GenState> {
        self.0
            .iter()
            .filter(|&(_, &l)| l > 0)
            .map(|(&c, &l)| {
                let mut prev = self.clone();
                prev.0.insert(c, l - 1);
                prev
            })
            .collect()
    }

    /// Component-wise `self <= other` over the union of both column sets.
    pub fn leq(&self, other: &GenState) -> bool {
        self.0.keys().chain(other.0.keys()).all(|&c| self.level(c) <= other.level(c))
    }

    /// Strictly below `other`: component-wise `<=` and not equal.
    pub fn precedes(&self, other: &GenState) -> bool {
        self != other && self.leq(other)
    }
}

impl fmt::Display for GenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (c, l)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", c, l)?;
        }
        write!(f, "}}")
    }
}
