//! Evaluation dependency graph.
//!
//! While computing an attribute, the evaluator reads the values of other
//! (item, attribute) pairs through modifier operands. Each such read is
//! recorded here as a directed edge from the pair that was read to the
//! pair being computed. Invalidating a pair then walks the recorded edges
//! to find every cached value that transitively depended on it, which is
//! exactly the set that must be recomputed.
//!
//! Edges are only ever recorded for computations that actually happened,
//! so the graph never over- or under-approximates the live dependencies
//! of the cache.

use crate::ident::{AttrId, ItemId};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

/// A single attribute on a single item.
pub type AttrNode = (ItemId, AttrId);

/// Directed graph of observed evaluation dependencies.
///
/// # Examples
///
/// ```rust
/// use fitcalc::graph::DependencyGraph;
/// use fitcalc::{AttrId, ItemId};
///
/// let mut graph = DependencyGraph::new();
/// let src = (ItemId(1), AttrId(10));
/// let dep = (ItemId(2), AttrId(20));
///
/// // Computing `dep` read `src`.
/// graph.record_read(src, dep);
///
/// // Invalidating `src` reports `dep` as stale.
/// assert_eq!(graph.take_dependents(src), vec![dep]);
/// ```
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<AttrNode, ()>,
    node_map: HashMap<AttrNode, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node index for a pair, creating the node if needed.
    fn ensure_node(&mut self, node: AttrNode) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&node) {
            idx
        } else {
            let idx = self.graph.add_node(node);
            self.node_map.insert(node, idx);
            idx
        }
    }

    /// Record that computing `dependent` read the value of `source`.
    ///
    /// Recording the same read twice is harmless; the extra edge only
    /// costs memory until the next invalidation of either endpoint.
    pub fn record_read(&mut self, source: AttrNode, dependent: AttrNode) {
        let src_idx = self.ensure_node(source);
        let dep_idx = self.ensure_node(dependent);
        if !self.graph.contains_edge(src_idx, dep_idx) {
            self.graph.add_edge(src_idx, dep_idx, ());
        }
    }

    /// Every pair that transitively depended on `start`, in breadth-first
    /// order. The recorded dependency edges of `start` and of all returned
    /// pairs are dropped: their computations are stale and the edges will
    /// be re-recorded when they are recomputed.
    pub fn take_dependents(&mut self, start: AttrNode) -> Vec<AttrNode> {
        let Some(&start_idx) = self.node_map.get(&start) else {
            return Vec::new();
        };
        let mut stale = HashSet::new();
        stale.insert(start_idx);
        let mut queue = VecDeque::new();
        queue.push_back(start_idx);
        let mut dependents = Vec::new();
        while let Some(node) = queue.pop_front() {
            for succ in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if stale.insert(succ) {
                    queue.push_back(succ);
                    dependents.push(self.graph[succ]);
                }
            }
        }
        self.graph.retain_edges(|g, edge| match g.edge_endpoints(edge) {
            Some((a, b)) => !stale.contains(&a) && !stale.contains(&b),
            None => false,
        });
        dependents
    }

    /// Forget everything. Used on catalog swaps.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_map.clear();
    }

    /// Number of recorded edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
