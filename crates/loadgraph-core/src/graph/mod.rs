//! Arena-backed directed graph with cost-weighted nodes and edges.
//!
//! # Overview
//!
//! [`DirectedGraph`] owns a node arena and an edge arena and keeps both
//! adjacency directions (`out_edges`, `in_edges`) per node. Every algorithm
//! works on handles ([`NodeId`], [`EdgeId`]) so node identity never depends
//! on node contents.
//!
//! ## Pipeline
//!
//! ```text
//! Vec<N> + Vec<(NodeId, NodeId, E)>
//!        ↓  DirectedGraph::new()      (drops edges with dangling endpoints)
//! DirectedGraph<N, E>
//!        ├─ traversal:     topological_sort / reachable_nodes / ancestor_nodes
//!        ├─ critical_path: cost / critical_path
//!        ├─ serialize:     to_json / from_json
//!        └─ cycles:        find_cycles (diagnostics only)
//! ```
//!
//! ## Cycles
//!
//! Acyclicity is never enforced. Algorithms that assume a DAG degrade
//! silently on cyclic input: nodes on or behind a cycle are not emitted by
//! [`DirectedGraph::topological_sort`] and do not contribute to
//! [`DirectedGraph::cost`]. Use [`DirectedGraph::checked_topological_sort`]
//! when a cycle must be detected.

pub mod critical_path;
pub mod cycles;
pub mod serialize;
pub mod traversal;

use tracing::debug;

use crate::element::{Edge, EdgeId, Node, NodeId};
use crate::error::GraphError;

pub use critical_path::CriticalPath;

// ---------------------------------------------------------------------------
// EdgeSlot
// ---------------------------------------------------------------------------

/// An edge payload together with its current endpoints.
#[derive(Debug, Clone)]
struct EdgeSlot<E> {
    from: NodeId,
    to: NodeId,
    data: E,
}

// ---------------------------------------------------------------------------
// DirectedGraph
// ---------------------------------------------------------------------------

/// A directed graph over owned nodes and edges.
///
/// Multiple edges between the same pair of nodes are allowed; no duplicate
/// detection is performed.
#[derive(Debug, Clone)]
pub struct DirectedGraph<N, E> {
    nodes: Vec<N>,
    edges: Vec<EdgeSlot<E>>,
    out_edges: Vec<Vec<EdgeId>>,
    in_edges: Vec<Vec<EdgeId>>,
}

impl<N: Node, E: Edge> DirectedGraph<N, E> {
    /// Build a graph from `nodes` and `(from, to, edge)` triples.
    ///
    /// `NodeId(i)` refers to `nodes[i]`. Edges whose endpoints are not node
    /// positions are dropped: only `nodes ∩ endpoints` is kept. Surviving
    /// edges are numbered in input order.
    #[must_use]
    pub fn new(nodes: Vec<N>, edges: Vec<(NodeId, NodeId, E)>) -> Self {
        let node_count = nodes.len();
        let offered = edges.len();

        let mut graph = Self {
            nodes,
            edges: Vec::with_capacity(offered),
            out_edges: vec![Vec::new(); node_count],
            in_edges: vec![Vec::new(); node_count],
        };

        for (from, to, data) in edges {
            if from.0 >= node_count || to.0 >= node_count {
                continue;
            }
            let id = EdgeId(graph.edges.len());
            graph.edges.push(EdgeSlot { from, to, data });
            graph.out_edges[from.0].push(id);
            graph.in_edges[to.0].push(id);
        }

        let dropped = offered - graph.edges.len();
        if dropped > 0 {
            debug!(dropped, kept = graph.edges.len(), "dropped edges with endpoints outside the node set");
        }

        graph
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// `true` when the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node handles, in arena order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// All edge handles, in arena order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len()).map(EdgeId)
    }

    /// `true` if `node` is a member of this graph.
    #[must_use]
    pub fn contains_node(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    /// `true` if `edge` is a member of this graph.
    #[must_use]
    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        edge.0 < self.edges.len()
    }

    /// Borrow a node payload.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if `node` is not a member.
    pub fn node(&self, node: NodeId) -> Result<&N, GraphError> {
        self.nodes.get(node.0).ok_or(GraphError::UnknownNode(node))
    }

    /// Mutably borrow a node payload.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if `node` is not a member.
    pub fn node_mut(&mut self, node: NodeId) -> Result<&mut N, GraphError> {
        self.nodes.get_mut(node.0).ok_or(GraphError::UnknownNode(node))
    }

    /// Borrow an edge payload.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownEdge`] if `edge` is not a member.
    pub fn edge(&self, edge: EdgeId) -> Result<&E, GraphError> {
        self.edges
            .get(edge.0)
            .map(|slot| &slot.data)
            .ok_or(GraphError::UnknownEdge(edge))
    }

    /// Mutably borrow an edge payload.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownEdge`] if `edge` is not a member.
    pub fn edge_mut(&mut self, edge: EdgeId) -> Result<&mut E, GraphError> {
        self.edges
            .get_mut(edge.0)
            .map(|slot| &mut slot.data)
            .ok_or(GraphError::UnknownEdge(edge))
    }

    /// Current `(from, to)` endpoints of `edge`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownEdge`] if `edge` is not a member.
    pub fn edge_endpoints(&self, edge: EdgeId) -> Result<(NodeId, NodeId), GraphError> {
        self.edges
            .get(edge.0)
            .map(|slot| (slot.from, slot.to))
            .ok_or(GraphError::UnknownEdge(edge))
    }

    /// Edges leaving `node`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if `node` is not a member.
    pub fn out_edges(&self, node: NodeId) -> Result<&[EdgeId], GraphError> {
        self.out_edges
            .get(node.0)
            .map(Vec::as_slice)
            .ok_or(GraphError::UnknownNode(node))
    }

    /// Edges entering `node`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if `node` is not a member.
    pub fn in_edges(&self, node: NodeId) -> Result<&[EdgeId], GraphError> {
        self.in_edges
            .get(node.0)
            .map(Vec::as_slice)
            .ok_or(GraphError::UnknownNode(node))
    }

    /// Nodes without incoming edges, in arena order.
    #[must_use]
    pub fn root_nodes(&self) -> Vec<NodeId> {
        self.node_ids()
            .filter(|n| self.in_edges[n.0].is_empty())
            .collect()
    }

    /// Move `edge` so that it runs `new_from → new_to`.
    ///
    /// The edge keeps its handle and payload (including its cost). It is
    /// appended to the adjacency lists of its new endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownEdge`] or [`GraphError::UnknownNode`] if
    /// any argument is not a member. The graph is left unchanged on error.
    pub fn update_edge(
        &mut self,
        edge: EdgeId,
        new_from: NodeId,
        new_to: NodeId,
    ) -> Result<(), GraphError> {
        let (old_from, old_to) = self.edge_endpoints(edge)?;
        if !self.contains_node(new_from) {
            return Err(GraphError::UnknownNode(new_from));
        }
        if !self.contains_node(new_to) {
            return Err(GraphError::UnknownNode(new_to));
        }

        self.out_edges[old_from.0].retain(|&e| e != edge);
        self.in_edges[old_to.0].retain(|&e| e != edge);

        let slot = &mut self.edges[edge.0];
        slot.from = new_from;
        slot.to = new_to;

        self.out_edges[new_from.0].push(edge);
        self.in_edges[new_to.0].push(edge);

        debug!(%edge, from = %old_from, to = %old_to, new_from = %new_from, new_to = %new_to, "edge rewired");
        Ok(())
    }

    /// Iterate over `(id, node)` pairs.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &N)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Iterate over `(id, from, to, edge)` tuples.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, NodeId, NodeId, &E)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, slot)| (EdgeId(i), slot.from, slot.to, &slot.data))
    }

    // Unchecked helpers for algorithms that only ever hold member handles.

    pub(crate) fn outgoing(&self, node: NodeId) -> &[EdgeId] {
        &self.out_edges[node.0]
    }

    pub(crate) fn incoming(&self, node: NodeId) -> &[EdgeId] {
        &self.in_edges[node.0]
    }

    pub(crate) fn slot(&self, edge: EdgeId) -> (NodeId, NodeId, &E) {
        let slot = &self.edges[edge.0];
        (slot.from, slot.to, &slot.data)
    }

    pub(crate) fn node_cost(&self, node: NodeId) -> f64 {
        self.nodes[node.0].cost()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
