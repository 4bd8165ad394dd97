//! Timing correction of initiator edges.
//!
//! # Overview
//!
//! Browser instrumentation attributes every fetch issued by a script to that
//! script. In practice a script often fetches a data file first and only
//! issues the remaining requests once the data has arrived, so the data file
//! is the real cause of those later requests. This pass re-parents such
//! edges onto the sibling that explains them.
//!
//! # Algorithm
//!
//! Parents are visited in topological order. For a script-like parent, its
//! outgoing edges are sorted twice: `by_start` (child start time) and
//! `by_end` (child end time). A single cursor `j` sweeps `by_end` and never
//! moves backwards. For each child `c` in `by_start` order:
//!
//! 1. Advance `j` while the candidate at `j` is not `c`'s own edge, and the
//!    candidate is not manifest-like or the next candidate also finishes
//!    before `c` starts.
//! 2. If `j` sits on `c`'s own edge, `c` keeps its parent.
//! 3. If `j` ran off the end, the parent is done.
//! 4. Otherwise, if the candidate finished by the time `c` started, `c`'s
//!    edge is moved under the candidate and flagged `is_timing`.
//!
//! The pass only runs on a DAG. On cyclic input it is skipped and every
//! observed edge is kept.

use tracing::{debug, instrument, warn};

use loadgraph_core::{DirectedGraph, EdgeId, NodeId};

use crate::config::TimingConfig;
use crate::node::{RequestEdge, RequestNode};

pub(crate) type RequestGraph = DirectedGraph<RequestNode, RequestEdge>;

/// Terminal state of the correction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimingCorrection {
    /// The pass ran; `rewired` edges were re-parented.
    Applied { rewired: usize },
    /// The graph had cycles; observed edges were kept as-is.
    SkippedCycle {
        /// Request ids of each cycle, sorted.
        cycles: Vec<Vec<String>>,
    },
    /// Disabled by configuration.
    Disabled,
    /// The graph was restored from a serialized document; whatever
    /// correction was applied before serialization is baked into its edges.
    Restored,
}

impl TimingCorrection {
    #[must_use]
    pub const fn rewired(&self) -> usize {
        match self {
            Self::Applied { rewired } => *rewired,
            _ => 0,
        }
    }
}

/// A planned re-parenting of one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rewire {
    pub edge: EdgeId,
    pub new_parent: NodeId,
    pub child: NodeId,
}

/// What the sweep needs to know about one outgoing edge of a parent.
#[derive(Debug, Clone)]
pub(crate) struct ChildTiming<'a> {
    pub edge: EdgeId,
    pub child: NodeId,
    pub request_id: &'a str,
    pub start_msec: f64,
    pub end_msec: f64,
    pub manifest_like: bool,
}

/// Run the correction over the whole graph.
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub(crate) fn handle_timing_dependencies(
    graph: &mut RequestGraph,
    config: &TimingConfig,
) -> TimingCorrection {
    let order = match graph.checked_topological_sort(None) {
        Ok(order) => order,
        Err(err) => {
            let cycles = cycle_request_ids(graph);
            warn!(%err, ?cycles, "request dependencies are cyclic; skipping timing correction");
            return TimingCorrection::SkippedCycle { cycles };
        }
    };

    let mut rewired = 0;
    for parent in order {
        rewired += split_children_by_time(graph, parent, config);
    }

    debug!(rewired, "timing correction applied");
    TimingCorrection::Applied { rewired }
}

/// Re-parent the children of `parent` that are better explained by a
/// sibling. Returns the number of edges moved.
fn split_children_by_time(graph: &mut RequestGraph, parent: NodeId, config: &TimingConfig) -> usize {
    let rewires = {
        let Ok(parent_node) = graph.node(parent) else {
            return 0;
        };
        if !config.is_script(parent_node.request.content_type()) {
            return 0;
        }
        let Ok(out_edges) = graph.out_edges(parent) else {
            return 0;
        };

        let children: Vec<ChildTiming<'_>> = out_edges
            .iter()
            .filter_map(|&edge| {
                let (_, child) = graph.edge_endpoints(edge).ok()?;
                let request = &graph.node(child).ok()?.request;
                Some(ChildTiming {
                    edge,
                    child,
                    request_id: &request.request_id,
                    start_msec: request.start_msec,
                    end_msec: request.end_msec,
                    manifest_like: config.is_manifest_like(request.content_type()),
                })
            })
            .collect();

        let parent_request = &parent_node.request;
        for child in &children {
            if child.start_msec < parent_request.end_msec - config.overlap_tolerance_msec {
                warn!(
                    parent = %parent_request.request_id,
                    child = %child.request_id,
                    parent_end_msec = parent_request.end_msec,
                    child_start_msec = child.start_msec,
                    "child request started before its script parent finished"
                );
            }
        }

        plan_rewires(&children)
    };

    apply_rewires(graph, parent, &rewires)
}

/// Move each planned edge and flag it `is_timing`. An edge that cannot be
/// moved keeps its parent and its flag. Returns the number of edges moved.
fn apply_rewires(graph: &mut RequestGraph, parent: NodeId, rewires: &[Rewire]) -> usize {
    let mut applied = 0;
    for rewire in rewires {
        match graph.update_edge(rewire.edge, rewire.new_parent, rewire.child) {
            Ok(()) => {
                if let Ok(edge) = graph.edge_mut(rewire.edge) {
                    edge.is_timing = true;
                }
                applied += 1;
                debug!(
                    edge = %rewire.edge,
                    old_parent = %parent,
                    new_parent = %rewire.new_parent,
                    child = %rewire.child,
                    "re-parented edge by timing"
                );
            }
            Err(err) => warn!(%err, edge = %rewire.edge, "could not re-parent edge"),
        }
    }
    applied
}

/// The two-pointer sweep over one parent's children.
///
/// Pure: decides which edges move where without touching the graph.
pub(crate) fn plan_rewires(children: &[ChildTiming<'_>]) -> Vec<Rewire> {
    let mut by_start: Vec<&ChildTiming<'_>> = children.iter().collect();
    by_start.sort_by(|a, b| a.start_msec.total_cmp(&b.start_msec));
    let mut by_end: Vec<&ChildTiming<'_>> = children.iter().collect();
    by_end.sort_by(|a, b| a.end_msec.total_cmp(&b.end_msec));

    let mut rewires = Vec::new();
    let mut j = 0;

    for current in by_start {
        while j < by_end.len()
            && by_end[j].edge != current.edge
            && (!by_end[j].manifest_like
                || by_end
                    .get(j + 1)
                    .is_some_and(|next| next.end_msec < current.start_msec))
        {
            j += 1;
        }

        let Some(candidate) = by_end.get(j) else {
            break;
        };
        if candidate.edge == current.edge {
            continue;
        }
        if candidate.end_msec <= current.start_msec {
            rewires.push(Rewire {
                edge: current.edge,
                new_parent: candidate.child,
                child: current.child,
            });
        }
    }

    rewires
}

fn cycle_request_ids(graph: &RequestGraph) -> Vec<Vec<String>> {
    graph
        .find_cycles()
        .into_iter()
        .map(|members| {
            let mut ids: Vec<String> = members
                .into_iter()
                .filter_map(|n| graph.node(n).ok())
                .map(|node| node.request.request_id.clone())
                .collect();
            ids.sort_unstable();
            ids
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
