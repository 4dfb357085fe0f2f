//! Antichain accumulator for search results.

use genlattice_lattice::{Lattice, NodeId};
use genlattice_rules::GenState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontierKind {
    /// Keep the least general nodes.
    Minimal,
    /// Keep the most general nodes.
    Maximal,
}

/// Set of mutually incomparable lattice nodes.
#[derive(Debug, Clone)]
pub struct Frontier {
    kind: FrontierKind,
    members: Vec<NodeId>,
}

impl Frontier {
    pub fn new(kind: FrontierKind) -> Self {
        Self {
            kind,
            members: Vec::new(),
        }
    }

    pub fn minimal() -> Self {
        Self::new(FrontierKind::Minimal)
    }

    pub fn maximal() -> Self {
        Self::new(FrontierKind::Maximal)
    }

    pub fn kind(&self) -> FrontierKind {
        self.kind
    }

    /// Add `node`, dropping the members it supersedes.
    ///
    /// Returns false when `node` is already present or covered by a member.
    pub fn insert(&mut self, lattice: &Lattice<'_>, node: NodeId) -> bool {
        // `better(a, b)`: a is preferred to b and they are comparable
        let kind = self.kind;
        let better = |a: NodeId, b: NodeId| match kind {
            FrontierKind::Minimal => lattice.dominates(a, b),
            FrontierKind::Maximal => lattice.dominates(b, a),
        };

        if self.members.iter().any(|&m| m == node || better(m, node)) {
            return false;
        }
        let kept: Vec<NodeId> = self
            .members
            .iter()
            .copied()
            .filter(|&m| !better(node, m))
            .collect();
        self.members = kept;
        self.members.push(node);
        true
    }

    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    /// Members ordered by generalization state.
    pub fn sorted(&self, lattice: &Lattice<'_>) -> Vec<NodeId> {
        let mut members = self.members.clone();
        members.sort_by(|a, b| lattice.state(*a).cmp(lattice.state(*b)));
        members
    }

    pub fn states(&self, lattice: &Lattice<'_>) -> Vec<GenState> {
        self.sorted(lattice)
            .into_iter()
            .map(|n| lattice.state(n).clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
