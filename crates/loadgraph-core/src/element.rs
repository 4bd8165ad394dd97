//! Node and edge building blocks.
//!
//! Graph members are addressed by arena handles rather than by reference:
//! a [`NodeId`] is the position of a node in the vector handed to
//! [`DirectedGraph::new`](crate::graph::DirectedGraph::new), and an
//! [`EdgeId`] is the position of an edge among those that survived
//! construction. Handles stay valid for the lifetime of the graph; rewiring
//! an edge keeps its [`EdgeId`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable handle of a node inside a [`DirectedGraph`](crate::graph::DirectedGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable handle of an edge inside a [`DirectedGraph`](crate::graph::DirectedGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

impl EdgeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A graph vertex carrying a scalar cost (its own time contribution).
pub trait Node {
    fn cost(&self) -> f64;

    /// Overwrite the cost, e.g. after re-measuring the underlying work.
    fn set_cost(&mut self, cost: f64);
}

/// A directed connection carrying the cost of traversing it.
///
/// Edge costs may be negative when the child started before the parent
/// finished; the critical path computation clamps the contribution at zero.
pub trait Edge {
    fn cost(&self) -> f64;
}

/// Plain node holding nothing but its cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostNode {
    #[serde(default)]
    pub cost: f64,
}

impl CostNode {
    #[must_use]
    pub const fn new(cost: f64) -> Self {
        Self { cost }
    }
}

impl Node for CostNode {
    fn cost(&self) -> f64 {
        self.cost
    }

    fn set_cost(&mut self, cost: f64) {
        self.cost = cost;
    }
}

/// Plain edge holding nothing but its cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostEdge {
    #[serde(default)]
    pub cost: f64,
}

impl CostEdge {
    #[must_use]
    pub const fn new(cost: f64) -> Self {
        Self { cost }
    }
}

impl Edge for CostEdge {
    fn cost(&self) -> f64 {
        self.cost
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn missing_cost_defaults_to_zero() {
        let node: CostNode = serde_json::from_str("{}").expect("decode node");
        let edge: CostEdge = serde_json::from_str("{}").expect("decode edge");
        assert_eq!(node.cost, 0.0);
        assert_eq!(edge.cost, 0.0);
    }

    #[test]
    fn set_cost_overwrites() {
        let mut node = CostNode::new(3.0);
        node.set_cost(7.5);
        assert_eq!(Node::cost(&node), 7.5);
    }

    #[test]
    fn handles_display_compactly() {
        assert_eq!(NodeId(4).to_string(), "#4");
        assert_eq!(EdgeId(2).to_string(), "e2");
    }
}
