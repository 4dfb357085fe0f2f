//! Lattice arena: nodes keyed by generalization state, child edges expanded lazily.

use std::collections::{HashMap, HashSet, VecDeque};

use genlattice_core::{Error, Record, Result};
use genlattice_metrics::MetricInput;
use genlattice_rules::{apply_gen, protected_columns, GenState, RuleSet};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::predicate::Predicate;

pub type NodeId = NodeIndex;

/// Which way a suitable tag spreads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagDirection {
    /// Suitable implies every more general node is suitable (k-anonymity).
    Upward,
    /// Suitable implies every less general node is suitable (information-loss bound).
    Downward,
}

#[derive(Debug, Clone)]
pub struct LatticeNode {
    pub state: GenState,
    tag: Option<bool>,
    expanded: bool,
}

impl LatticeNode {
    fn new(state: GenState) -> Self {
        Self {
            state,
            tag: None,
            expanded: false,
        }
    }

    /// `Some(true)` once tagged suitable, `Some(false)` once tagged not suitable.
    pub fn tag(&self) -> Option<bool> {
        self.tag
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatticeCounters {
    pub visited: u64,
    pub checked: u64,
    pub suitable: u64,
    pub not_suitable: u64,
}

/// Generalization lattice over one record set and rule set.
///
/// Holds the shared context every node needs: the borrowed records and rules,
/// the predicate, the tag direction, the counters and a one-slot cache of the
/// last generalized record set.
pub struct Lattice<'a> {
    graph: DiGraph<LatticeNode, ()>,
    index: HashMap<GenState, NodeIndex>,
    records: &'a [Record],
    rules: &'a RuleSet,
    predicate: Predicate,
    direction: TagDirection,
    counters: LatticeCounters,
    release_cache: Option<(NodeIndex, Vec<Record>)>,
    bottom: NodeIndex,
    top: NodeIndex,
}

impl<'a> Lattice<'a> {
    pub fn build_network(
        rules: &'a RuleSet,
        records: &'a [Record],
        predicate: Predicate,
        direction: TagDirection,
    ) -> Self {
        info!(
            "Building lattice over {} columns and {} records",
            rules.len(),
            records.len()
        );
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        let bottom = insert_node(&mut graph, &mut index, GenState::bottom(rules));
        let top = insert_node(&mut graph, &mut index, GenState::top(rules));

        Self {
            graph,
            index,
            records,
            rules,
            predicate,
            direction,
            counters: LatticeCounters::default(),
            release_cache: None,
            bottom,
            top,
        }
    }

    pub fn bottom(&self) -> NodeId {
        self.bottom
    }

    pub fn top(&self) -> NodeId {
        self.top
    }

    pub fn records(&self) -> &'a [Record] {
        self.records
    }

    pub fn rules(&self) -> &'a RuleSet {
        self.rules
    }

    pub fn columns(&self) -> Vec<usize> {
        protected_columns(self.rules)
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn direction(&self) -> TagDirection {
        self.direction
    }

    pub fn counters(&self) -> LatticeCounters {
        self.counters
    }

    /// Number of materialized nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn node(&self, id: NodeId) -> &LatticeNode {
        &self.graph[id]
    }

    pub fn state(&self, id: NodeId) -> &GenState {
        &self.graph[id].state
    }

    pub fn tag(&self, id: NodeId) -> Option<bool> {
        self.graph[id].tag
    }

    pub fn find(&self, state: &GenState) -> Option<NodeId> {
        self.index.get(state).copied()
    }

    /// Node for `state`, materialized if needed.
    pub fn node_for(&mut self, state: GenState) -> NodeId {
        insert_node(&mut self.graph, &mut self.index, state)
    }

    /// Nodes one level higher on exactly one column, in state order.
    pub fn children(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.graph[id].expanded {
            let states = self.graph[id].state.children(self.rules);
            for state in states {
                let child = self.node_for(state);
                self.graph.add_edge(id, child, ());
            }
            self.graph[id].expanded = true;
        }
        let mut children: Vec<NodeId> = self.graph.neighbors_directed(id, Direction::Outgoing).collect();
        children.sort_by(|x, y| self.graph[*x].state.cmp(&self.graph[*y].state));
        children
    }

    /// Nodes one level lower on exactly one column.
    pub fn parents(&mut self, id: NodeId) -> Vec<NodeId> {
        let states = self.graph[id].state.parents();
        states.into_iter().map(|state| self.node_for(state)).collect()
    }

    /// Nodes `n` with `b <= n <= t`, grouped by height from `b` upwards and
    /// sorted within each layer. Empty when `b` is not below `t`.
    pub fn layers(&mut self, b: NodeId, t: NodeId) -> Vec<Vec<NodeId>> {
        let low = self.state(b).clone();
        let high = self.state(t).clone();
        if !low.leq(&high) {
            return Vec::new();
        }

        let base = low.height();
        let mut layers = vec![Vec::new(); (high.height() - base) as usize + 1];
        let mut seen = HashSet::from([b]);
        let mut queue = VecDeque::from([b]);
        while let Some(id) = queue.pop_front() {
            let height = self.state(id).height();
            layers[(height - base) as usize].push(id);
            for child in self.children(id) {
                if self.state(child).leq(&high) && seen.insert(child) {
                    queue.push_back(child);
                }
            }
        }

        for layer in &mut layers {
            layer.sort_by(|x, y| self.graph[*x].state.cmp(&self.graph[*y].state));
        }
        layers
    }

    /// The `i`-th height layer between `b` and `t`.
    pub fn layer(&mut self, b: NodeId, t: NodeId, i: usize) -> Vec<NodeId> {
        self.layers(b, t).into_iter().nth(i).unwrap_or_default()
    }

    /// Every node of the lattice, bottom layer first.
    pub fn all_nodes(&mut self) -> Vec<NodeId> {
        let (b, t) = (self.bottom, self.top);
        self.layers(b, t).into_iter().flatten().collect()
    }

    /// `a` strictly below `b`, i.e. `b` is reachable from `a` by child edges.
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        self.state(a).precedes(self.state(b))
    }

    /// Count one visit by the search. Visits include nodes whose tag was already known.
    pub fn visit(&mut self) {
        self.counters.visited += 1;
    }

    /// Run the predicate on a node. Does not tag it.
    pub fn evaluate(&mut self, id: NodeId) -> Result<bool> {
        self.counters.checked += 1;
        if self.predicate.needs_release() {
            self.cache_release(id)?;
        }

        let release = self
            .release_cache
            .as_ref()
            .filter(|(cached, _)| *cached == id)
            .map(|(_, records)| records.as_slice());
        let input = MetricInput {
            rules: self.rules,
            state: &self.graph[id].state,
            original: self.records,
            release,
        };
        let suitable = self.predicate.holds(&input)?;
        debug!("checked {}: suitable={}", self.graph[id].state, suitable);
        Ok(suitable)
    }

    /// Generalized records for a node, reusing the last materialization.
    pub fn release(&mut self, id: NodeId) -> Result<&[Record]> {
        self.cache_release(id)?;
        match &self.release_cache {
            Some((_, records)) => Ok(records.as_slice()),
            None => Err(Error::Internal("release cache empty after fill".into())),
        }
    }

    fn cache_release(&mut self, id: NodeId) -> Result<()> {
        if matches!(&self.release_cache, Some((cached, _)) if *cached == id) {
            return Ok(());
        }
        let records = apply_gen(self.records, &self.graph[id].state, self.rules)?;
        self.release_cache = Some((id, records));
        Ok(())
    }

    pub fn tag_suitable(&mut self, id: NodeId) {
        self.set_tag(id, true);
    }

    pub fn tag_not_suitable(&mut self, id: NodeId) {
        self.set_tag(id, false);
    }

    /// Tag `id` and every node the tag implies.
    ///
    /// # Panics
    ///
    /// When a node already carries the opposite tag, which only happens for
    /// non-monotonic predicates.
    fn set_tag(&mut self, id: NodeId, suitable: bool) {
        let upward = matches!(
            (self.direction, suitable),
            (TagDirection::Upward, true) | (TagDirection::Downward, false)
        );

        let mut queue = VecDeque::from([id]);
        while let Some(n) = queue.pop_front() {
            match self.graph[n].tag {
                Some(existing) if existing == suitable => continue,
                Some(existing) => panic!(
                    "node {} already tagged suitable={}, cannot tag suitable={}",
                    self.graph[n].state, existing, suitable
                ),
                None => {}
            }

            self.graph[n].tag = Some(suitable);
            if suitable {
                self.counters.suitable += 1;
            } else {
                self.counters.not_suitable += 1;
            }

            let next = if upward {
                self.children(n)
            } else {
                self.parents(n)
            };
            queue.extend(next);
        }
    }
}

fn insert_node(
    graph: &mut DiGraph<LatticeNode, ()>,
    index: &mut HashMap<GenState, NodeIndex>,
    state: GenState,
) -> NodeIndex {
    if let Some(&id) = index.get(&state) {
        return id;
    }
    let id = graph.add_node(LatticeNode::new(state.clone()));
    index.insert(state, id);
    id
}
