//! Request dependency graph for one captured page load.
//!
//! # Construction
//!
//! ```text
//! Vec<Request>              DependencyLens
//!      ↓ one RequestNode per id    ↓ (parent, child, reason) triples
//!      └───────────┬───────────────┘
//!                  ↓ drop triples naming unknown ids
//!        DirectedGraph<RequestNode, RequestEdge>
//!                  ↓ correction::handle_timing_dependencies
//!        timing-corrected graph (or observed edges, if cyclic)
//! ```
//!
//! Duplicate request ids are tolerated: the last request with a given id
//! wins. The first request of the list is the navigation and serves as the
//! root for [`RequestDependencyGraph::cost`] when `from_first_request` is set.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use loadgraph_core::{CriticalPath, DirectedGraph, GraphError, Node, NodeId};

use crate::config::TimingConfig;
use crate::correction::{self, RequestGraph, TimingCorrection};
use crate::lens::DependencyLens;
use crate::node::{RequestEdge, RequestNode};
use crate::request::Request;

// ---------------------------------------------------------------------------
// RequestDependencyGraph
// ---------------------------------------------------------------------------

/// Dependency graph between the requests of one trace.
#[derive(Debug, Clone)]
pub struct RequestDependencyGraph {
    requests: Vec<Request>,
    graph: RequestGraph,
    nodes_by_id: HashMap<String, NodeId>,
    first_node: Option<NodeId>,
    correction: TimingCorrection,
}

impl RequestDependencyGraph {
    /// Build with the default [`TimingConfig`].
    #[must_use]
    pub fn new(requests: Vec<Request>, lens: &impl DependencyLens) -> Self {
        Self::with_config(requests, lens, &TimingConfig::default())
    }

    /// Build the graph and run the timing correction once.
    ///
    /// Never fails: unknown ids, duplicate ids and cycles are tolerated.
    #[must_use]
    #[instrument(skip_all, fields(requests = requests.len()))]
    pub fn with_config(
        requests: Vec<Request>,
        lens: &impl DependencyLens,
        config: &TimingConfig,
    ) -> Self {
        let mut nodes: Vec<RequestNode> = Vec::with_capacity(requests.len());
        let mut nodes_by_id: HashMap<String, NodeId> = HashMap::with_capacity(requests.len());
        let mut duplicates = 0_usize;

        for request in &requests {
            if let Some(&id) = nodes_by_id.get(&request.request_id) {
                duplicates += 1;
                nodes[id.index()] = RequestNode::new(request.clone());
            } else {
                nodes_by_id.insert(request.request_id.clone(), NodeId(nodes.len()));
                nodes.push(RequestNode::new(request.clone()));
            }
        }

        let mut edges = Vec::new();
        let mut dropped = 0_usize;
        for dep in lens.request_dependencies() {
            let (Some(&parent), Some(&child)) = (
                nodes_by_id.get(&dep.parent.request_id),
                nodes_by_id.get(&dep.child.request_id),
            ) else {
                dropped += 1;
                continue;
            };
            let edge = RequestEdge::new(&nodes[parent.index()], &nodes[child.index()], dep.reason);
            edges.push((parent, child, edge));
        }

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            duplicates,
            dropped,
            "built request dependency graph"
        );

        let first_node = first_node(&requests, &nodes_by_id);
        let mut graph = DirectedGraph::new(nodes, edges);

        let correction = if config.correct_timing {
            correction::handle_timing_dependencies(&mut graph, config)
        } else {
            TimingCorrection::Disabled
        };

        Self {
            requests,
            graph,
            nodes_by_id,
            first_node,
            correction,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Requests in trace order, duplicates included.
    #[must_use]
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// The underlying generic graph.
    #[must_use]
    pub const fn graph(&self) -> &DirectedGraph<RequestNode, RequestEdge> {
        &self.graph
    }

    /// Outcome of the construction-time correction pass.
    #[must_use]
    pub const fn correction_state(&self) -> &TimingCorrection {
        &self.correction
    }

    /// Node of the first (navigation) request, if there is one.
    #[must_use]
    pub const fn first_request_node(&self) -> Option<NodeId> {
        self.first_node
    }

    /// Node holding the request with `request_id`.
    #[must_use]
    pub fn node_for_id(&self, request_id: &str) -> Option<NodeId> {
        self.nodes_by_id.get(request_id).copied()
    }

    /// Node holding `request`, looked up by id.
    #[must_use]
    pub fn node_for_request(&self, request: &Request) -> Option<NodeId> {
        self.node_for_id(&request.request_id)
    }

    /// The request wrapped by `node`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if `node` is not a member.
    pub fn request(&self, node: NodeId) -> Result<&Request, GraphError> {
        Ok(&self.graph.node(node)?.request)
    }

    /// Every dependency as `(parent, child, edge)`, in edge order.
    pub fn request_edges(&self) -> impl Iterator<Item = (&Request, &Request, &RequestEdge)> + '_ {
        self.graph.edges().filter_map(|(_, from, to, edge)| {
            let parent = &self.graph.node(from).ok()?.request;
            let child = &self.graph.node(to).ok()?.request;
            Some((parent, child, edge))
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Overwrite node costs for the ids present in `costs`.
    ///
    /// Ids without a node are ignored.
    pub fn update_requests_cost(&mut self, costs: &HashMap<String, f64>) {
        for (request_id, &cost) in costs {
            let Some(&id) = self.nodes_by_id.get(request_id) else {
                continue;
            };
            if let Ok(node) = self.graph.node_mut(id) {
                node.set_cost(cost);
            }
        }
    }

    /// Cost of the critical path.
    ///
    /// With `from_first_request`, only requests reachable from the first
    /// request count; otherwise the whole graph does.
    ///
    /// # Errors
    ///
    /// Only on internal inconsistency; see [`GraphError`].
    pub fn cost(&self, from_first_request: bool) -> Result<f64, GraphError> {
        Ok(self.critical_path(from_first_request)?.cost)
    }

    /// Critical path cost, node chain and per-node accumulated costs.
    ///
    /// # Errors
    ///
    /// Only on internal inconsistency; see [`GraphError`].
    pub fn critical_path(&self, from_first_request: bool) -> Result<CriticalPath, GraphError> {
        if !from_first_request {
            return self.graph.critical_path(None);
        }
        match self.first_node {
            Some(first) => self.graph.critical_path(Some(&[first])),
            None => Ok(CriticalPath::default()),
        }
    }

    /// Requests along the critical path, sources first.
    ///
    /// # Errors
    ///
    /// Only on internal inconsistency; see [`GraphError`].
    pub fn critical_path_requests(&self, from_first_request: bool) -> Result<Vec<&Request>, GraphError> {
        self.critical_path(from_first_request)?
            .path
            .into_iter()
            .map(|n| self.request(n))
            .collect()
    }

    /// Strict ancestors of `descendants`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownRequest`] if a descendant has no node.
    pub fn ancestor_requests(&self, descendants: &[&Request]) -> Result<Vec<&Request>, GraphError> {
        let nodes = descendants
            .iter()
            .map(|r| {
                self.node_for_request(r)
                    .ok_or_else(|| GraphError::UnknownRequest(r.request_id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.graph
            .ancestor_nodes(&nodes)?
            .into_iter()
            .map(|n| self.request(n))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Serialize as `{"graph": <graph document>, "requests": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<Value, GraphError> {
        let doc = DocumentRef {
            graph: self.graph.to_json()?,
            requests: &self.requests,
        };
        Ok(serde_json::to_value(doc)?)
    }

    /// Rebuild from the output of [`Self::to_json`].
    ///
    /// The correction pass is not re-run; the stored edges are used as-is
    /// and [`Self::correction_state`] reports [`TimingCorrection::Restored`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Json`] or [`GraphError::Serialization`] for
    /// malformed documents.
    pub fn from_json(value: Value) -> Result<Self, GraphError> {
        let doc: Document = serde_json::from_value(value)?;
        let graph = RequestGraph::from_json(doc.graph)?;

        let nodes_by_id: HashMap<String, NodeId> = graph
            .nodes()
            .map(|(id, node)| (node.request.request_id.clone(), id))
            .collect();
        let first_node = first_node(&doc.requests, &nodes_by_id);

        Ok(Self {
            requests: doc.requests,
            graph,
            nodes_by_id,
            first_node,
            correction: TimingCorrection::Restored,
        })
    }
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    graph: Value,
    requests: &'a [Request],
}

#[derive(Deserialize)]
struct Document {
    graph: Value,
    requests: Vec<Request>,
}

fn first_node(requests: &[Request], nodes_by_id: &HashMap<String, NodeId>) -> Option<NodeId> {
    requests
        .first()
        .and_then(|r| nodes_by_id.get(&r.request_id).copied())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::lens::StaticDependencyLens;
    use crate::request::DependencyReason;

    fn req(id: &str, start: f64, end: f64, content_type: &str) -> Request {
        Request::new(id, start, end, content_type)
    }

    #[test]
    fn empty_trace() {
        let g = RequestDependencyGraph::new(Vec::new(), &StaticDependencyLens::default());
        assert_eq!(g.cost(true).expect("cost"), 0.0);
        assert_eq!(g.cost(false).expect("cost"), 0.0);
        assert!(g.first_request_node().is_none());
        assert_eq!(g.correction_state(), &TimingCorrection::Applied { rewired: 0 });
    }

    #[test]
    fn unknown_ids_are_dropped() {
        let requests = vec![req("a", 0.0, 10.0, "html"), req("b", 10.0, 12.0, "image")];
        let stranger = req("zzz", 0.0, 1.0, "image");
        let lens = StaticDependencyLens::new(vec![
            (requests[0].clone(), requests[1].clone(), DependencyReason::Parser),
            (requests[0].clone(), stranger.clone(), DependencyReason::Parser),
            (stranger, requests[1].clone(), DependencyReason::Script),
        ]);
        let g = RequestDependencyGraph::new(requests, &lens);
        assert_eq!(g.graph().node_count(), 2);
        assert_eq!(g.graph().edge_count(), 1);
    }

    #[test]
    fn duplicate_ids_keep_the_last_request() {
        let requests = vec![
            req("a", 0.0, 10.0, "html"),
            req("b", 10.0, 12.0, "image"),
            req("b", 10.0, 30.0, "image"),
        ];
        let g = RequestDependencyGraph::new(requests, &StaticDependencyLens::default());
        assert_eq!(g.graph().node_count(), 2);
        let b = g.node_for_id("b").expect("b has a node");
        assert_eq!(g.request(b).expect("member").end_msec, 30.0);
        assert_eq!(g.requests().len(), 3);
    }

    #[test]
    fn whole_graph_cost_includes_unreachable_requests() {
        let requests = vec![req("nav", 0.0, 10.0, "html"), req("orphan", 0.0, 50.0, "image")];
        let g = RequestDependencyGraph::new(requests, &StaticDependencyLens::default());
        assert_eq!(g.cost(true).expect("cost"), 10.0);
        assert_eq!(g.cost(false).expect("cost"), 50.0);
    }

    #[test]
    fn update_requests_cost_overwrites_known_ids() {
        let requests = vec![req("a", 0.0, 10.0, "html"), req("b", 10.0, 12.0, "image")];
        let lens = StaticDependencyLens::from_ids(&requests, &[("a", "b", DependencyReason::Parser)]);
        let mut g = RequestDependencyGraph::new(requests, &lens);
        assert_eq!(g.cost(true).expect("cost"), 12.0);

        let costs = HashMap::from([("b".to_string(), 40.0), ("nope".to_string(), 1.0)]);
        g.update_requests_cost(&costs);
        assert_eq!(g.cost(true).expect("cost"), 50.0);
    }

    #[test]
    fn ancestor_requests_rejects_unknown_request() {
        let requests = vec![req("a", 0.0, 10.0, "html")];
        let g = RequestDependencyGraph::new(requests, &StaticDependencyLens::default());
        let stranger = req("x", 0.0, 1.0, "image");
        assert!(matches!(
            g.ancestor_requests(&[&stranger]),
            Err(GraphError::UnknownRequest(id)) if id == "x"
        ));
    }

    #[test]
    fn disabled_correction_keeps_observed_edges() {
        let requests = vec![
            req("js", 0.0, 10.0, "script"),
            req("json", 10.0, 15.0, "data/json"),
            req("img", 20.0, 30.0, "image"),
        ];
        let lens = StaticDependencyLens::from_ids(
            &requests,
            &[
                ("js", "json", DependencyReason::Script),
                ("js", "img", DependencyReason::Script),
            ],
        );
        let config = TimingConfig {
            correct_timing: false,
            ..TimingConfig::default()
        };
        let g = RequestDependencyGraph::with_config(requests, &lens, &config);
        assert_eq!(g.correction_state(), &TimingCorrection::Disabled);
        assert!(g.request_edges().all(|(parent, _, edge)| parent.request_id == "js" && !edge.is_timing));
    }
}
