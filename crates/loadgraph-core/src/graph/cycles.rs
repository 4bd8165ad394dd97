//! Cycle diagnostics.
//!
//! Graph algorithms here tolerate cycles silently; this module exists so
//! callers can report *which* nodes are involved when that matters.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::element::{Edge, Node, NodeId};

use super::DirectedGraph;

impl<N: Node, E: Edge> DirectedGraph<N, E> {
    /// View of the current topology as a petgraph [`DiGraph`].
    ///
    /// Node weights are the arena handles; `NodeIndex::new(i)` corresponds
    /// to `NodeId(i)`.
    #[must_use]
    pub fn to_petgraph(&self) -> DiGraph<NodeId, ()> {
        let mut graph = DiGraph::with_capacity(self.node_count(), self.edge_count());
        for id in self.node_ids() {
            graph.add_node(id);
        }
        for slot in &self.edges {
            graph.add_edge(NodeIndex::new(slot.from.0), NodeIndex::new(slot.to.0), ());
        }
        graph
    }

    /// All cycles currently present in the graph.
    ///
    /// Each entry is the sorted member list of one strongly connected
    /// component with more than one node, or a single node with a self loop.
    /// Entries are sorted.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Vec<NodeId>> {
        let graph = self.to_petgraph();

        let mut cycles: Vec<Vec<NodeId>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&idx| graph.find_edge(idx, idx).is_some())
            })
            .map(|component| {
                let mut members: Vec<NodeId> =
                    component.into_iter().map(|idx| graph[idx]).collect();
                members.sort_unstable();
                members
            })
            .collect();

        cycles.sort_unstable();
        cycles
    }

    /// `true` if [`Self::find_cycles`] would return anything.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.to_petgraph())
    }
}
