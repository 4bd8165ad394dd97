//! Critical path analysis.
//!
//! # Definitions
//!
//! For a node `n` visited in topological order, its accumulated cost is
//!
//! ```text
//! cost[n] = n.cost + max(0, max over in-edges e = (p → n) in the domain of cost[p] + e.cost)
//! ```
//!
//! The graph cost is the maximum accumulated cost over the domain, or 0
//! when the domain is empty. The critical path is one chain of nodes that
//! realises that maximum.
//!
//! # Path reconstruction
//!
//! Start from the first node (in topological order) that reaches the global
//! maximum, then repeatedly step to the in-edge source with the greatest
//! `cost[source] + edge.cost`, until a node with no costed predecessor is
//! reached. Ties keep the earliest in-edge.
//!
//! # Cycles
//!
//! Nodes that the topological sort cannot emit have no accumulated cost, so
//! on cyclic input the result under-counts rather than failing.

use crate::element::{Edge, Node, NodeId};
use crate::error::GraphError;

use super::DirectedGraph;

/// Result of [`DirectedGraph::critical_path`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriticalPath {
    /// Cost of the most expensive chain; 0 for an empty domain.
    pub cost: f64,
    /// One maximising chain, sources first. Empty for an empty domain.
    pub path: Vec<NodeId>,
    /// Accumulated cost of every costed node, in topological order.
    pub costs: Vec<(NodeId, f64)>,
}

impl CriticalPath {
    /// `true` if no node was costed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Accumulated cost of `node`, if it was part of the domain.
    #[must_use]
    pub fn cost_of(&self, node: NodeId) -> Option<f64> {
        self.costs
            .iter()
            .find(|(n, _)| *n == node)
            .map(|&(_, c)| c)
    }
}

impl<N: Node, E: Edge> DirectedGraph<N, E> {
    /// Cost of the critical path, restricted to nodes reachable from `roots`
    /// when given.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if a root is not a member.
    pub fn cost(&self, roots: Option<&[NodeId]>) -> Result<f64, GraphError> {
        Ok(self.critical_path(roots)?.cost)
    }

    /// Cost, one maximising path, and per-node accumulated costs.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if a root is not a member.
    pub fn critical_path(&self, roots: Option<&[NodeId]>) -> Result<CriticalPath, GraphError> {
        let domain = self.domain(roots)?;
        let (order, in_domain) = self.sort_domain(&domain);

        let mut accumulated: Vec<Option<f64>> = vec![None; self.node_count()];
        let mut costs = Vec::with_capacity(order.len());
        let mut best: Option<(NodeId, f64)> = None;

        for &node in &order {
            let inherited = self
                .incoming(node)
                .iter()
                .filter_map(|&e| {
                    let (from, _, edge) = self.slot(e);
                    if !in_domain[from.0] {
                        return None;
                    }
                    accumulated[from.0].map(|c| c + edge.cost())
                })
                .fold(0.0_f64, f64::max);

            let total = self.node_cost(node) + inherited;
            accumulated[node.0] = Some(total);
            costs.push((node, total));

            if best.is_none_or(|(_, c)| total > c) {
                best = Some((node, total));
            }
        }

        let Some((sink, cost)) = best else {
            return Ok(CriticalPath::default());
        };

        let path = self.reconstruct_path(sink, &accumulated);

        Ok(CriticalPath { cost, path, costs })
    }

    /// Walk backwards from `sink` along the most expensive costed in-edge.
    fn reconstruct_path(&self, sink: NodeId, accumulated: &[Option<f64>]) -> Vec<NodeId> {
        let mut path = vec![sink];
        let mut current = sink;

        loop {
            let mut prev: Option<(NodeId, f64)> = None;
            for &e in self.incoming(current) {
                let (from, _, edge) = self.slot(e);
                let Some(c) = accumulated[from.0] else {
                    continue;
                };
                let via = c + edge.cost();
                if prev.is_none_or(|(_, best)| via > best) {
                    prev = Some((from, via));
                }
            }

            match prev {
                // A costed predecessor is already on the path only if the
                // accumulated costs came from a cycle; stop there.
                Some((from, _)) if !path.contains(&from) => {
                    current = from;
                    path.push(current);
                }
                _ => break,
            }
        }

        path.reverse();
        path
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
