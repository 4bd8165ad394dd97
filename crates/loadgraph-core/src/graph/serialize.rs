//! Index-based JSON form of a [`DirectedGraph`].
//!
//! ```json
//! {
//!   "nodes": [ { "cost": 1.0, "__graph_node_index": 0 }, ... ],
//!   "edges": [ { "cost": 0.0, "__from_node_index": 0, "__to_node_index": 1 }, ... ]
//! }
//! ```
//!
//! Node and edge payloads are flattened into their records, so the
//! reserved `__*_index` keys must not be used as payload field names. The
//! payload types are fixed by the graph's type parameters; documents carry
//! no type tags.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::element::{Edge, Node, NodeId};
use crate::error::GraphError;

use super::DirectedGraph;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct NodeRecordRef<'a, N> {
    #[serde(flatten)]
    node: &'a N,
    #[serde(rename = "__graph_node_index")]
    index: usize,
}

#[derive(Serialize)]
struct EdgeRecordRef<'a, E> {
    #[serde(flatten)]
    edge: &'a E,
    #[serde(rename = "__from_node_index")]
    from: usize,
    #[serde(rename = "__to_node_index")]
    to: usize,
}

#[derive(Serialize)]
struct GraphDocumentRef<'a, N, E> {
    nodes: Vec<NodeRecordRef<'a, N>>,
    edges: Vec<EdgeRecordRef<'a, E>>,
}

#[derive(Deserialize)]
struct NodeRecord<N> {
    #[serde(flatten)]
    node: N,
    #[serde(rename = "__graph_node_index")]
    index: usize,
}

#[derive(Deserialize)]
struct EdgeRecord<E> {
    #[serde(flatten)]
    edge: E,
    #[serde(rename = "__from_node_index")]
    from: usize,
    #[serde(rename = "__to_node_index")]
    to: usize,
}

#[derive(Deserialize)]
struct GraphDocument<N, E> {
    nodes: Vec<NodeRecord<N>>,
    edges: Vec<EdgeRecord<E>>,
}

// ---------------------------------------------------------------------------
// DirectedGraph <-> JSON
// ---------------------------------------------------------------------------

impl<N, E> DirectedGraph<N, E>
where
    N: Node + Serialize,
    E: Edge + Serialize,
{
    /// Serialize to a JSON value. Record indices are arena positions.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Json`] if a payload fails to serialize.
    pub fn to_json(&self) -> Result<Value, GraphError> {
        let doc = GraphDocumentRef {
            nodes: self
                .nodes
                .iter()
                .enumerate()
                .map(|(index, node)| NodeRecordRef { node, index })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|slot| EdgeRecordRef {
                    edge: &slot.data,
                    from: slot.from.0,
                    to: slot.to.0,
                })
                .collect(),
        };
        Ok(serde_json::to_value(doc)?)
    }

    /// Serialize to a compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Json`] if a payload fails to serialize.
    pub fn to_json_string(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string(&self.to_json()?)?)
    }
}

impl<N, E> DirectedGraph<N, E>
where
    N: Node + DeserializeOwned,
    E: Edge + DeserializeOwned,
{
    /// Rebuild a graph from the output of [`Self::to_json`].
    ///
    /// Node records may appear in any order; their indices must cover
    /// `0..n` exactly once. Edge order is preserved.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Json`] if the document or a payload does not decode.
    /// - [`GraphError::Serialization`] for duplicate or out-of-range node
    ///   indices, or edges pointing at unknown indices.
    pub fn from_json(value: Value) -> Result<Self, GraphError> {
        let doc: GraphDocument<N, E> = serde_json::from_value(value)?;
        let count = doc.nodes.len();

        let mut slots: Vec<Option<N>> = std::iter::repeat_with(|| None).take(count).collect();
        for record in doc.nodes {
            let slot = slots.get_mut(record.index).ok_or_else(|| {
                GraphError::Serialization(format!(
                    "node index {} out of range for {count} node(s)",
                    record.index
                ))
            })?;
            if slot.replace(record.node).is_some() {
                return Err(GraphError::Serialization(format!(
                    "duplicate node index {}",
                    record.index
                )));
            }
        }
        // Every slot is filled: `count` records landed in `count` distinct slots.
        let nodes: Vec<N> = slots.into_iter().flatten().collect();

        let mut edges = Vec::with_capacity(doc.edges.len());
        for record in doc.edges {
            if record.from >= count || record.to >= count {
                return Err(GraphError::Serialization(format!(
                    "edge {} -> {} references a missing node",
                    record.from, record.to
                )));
            }
            edges.push((NodeId(record.from), NodeId(record.to), record.edge));
        }

        Ok(Self::new(nodes, edges))
    }

    /// Parse and rebuild from a JSON string.
    ///
    /// # Errors
    ///
    /// See [`Self::from_json`].
    pub fn from_json_str(json: &str) -> Result<Self, GraphError> {
        Self::from_json(serde_json::from_str(json)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
