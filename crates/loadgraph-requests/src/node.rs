//! Graph payloads for requests and their dependencies.

use serde::{Deserialize, Serialize};

use loadgraph_core::{Edge, Node};

use crate::request::{DependencyReason, Request, time_between};

/// A request as a graph node. Its cost starts as [`Request::cost`] and can
/// be overwritten later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestNode {
    pub request: Request,
    pub cost: f64,
}

impl RequestNode {
    #[must_use]
    pub fn new(request: Request) -> Self {
        let cost = request.cost();
        Self { request, cost }
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request.request_id
    }
}

impl Node for RequestNode {
    fn cost(&self) -> f64 {
        self.cost
    }

    fn set_cost(&mut self, cost: f64) {
        self.cost = cost;
    }
}

/// A dependency between two requests.
///
/// The cost is the gap computed by [`time_between`] when the edge was
/// created; it is kept when the edge is later re-parented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEdge {
    pub reason: DependencyReason,
    /// Set once the edge has been re-parented by the timing correction.
    #[serde(default)]
    pub is_timing: bool,
    pub cost: f64,
}

impl RequestEdge {
    #[must_use]
    pub fn new(parent: &RequestNode, child: &RequestNode, reason: DependencyReason) -> Self {
        Self {
            reason,
            is_timing: false,
            cost: time_between(&parent.request, &child.request, reason),
        }
    }
}

impl Edge for RequestEdge {
    fn cost(&self) -> f64 {
        self.cost
    }
}
