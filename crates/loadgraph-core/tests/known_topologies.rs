//! Known-topology regression tests for the generic graph.
//!
//! Each test uses a hand-crafted graph whose critical path, ordering and
//! ancestry can be worked out by hand. Expected values are hardcoded.

#![allow(clippy::float_cmp)]

use loadgraph_core::{CostEdge, CostNode, DirectedGraph, EdgeId, GraphError, NodeId};

// ---------------------------------------------------------------------------
// Helper: build a graph from node costs and weighted edges
// ---------------------------------------------------------------------------

fn build(costs: &[f64], edges: &[(usize, usize, f64)]) -> DirectedGraph<CostNode, CostEdge> {
    DirectedGraph::new(
        costs.iter().copied().map(CostNode::new).collect(),
        edges
            .iter()
            .map(|&(a, b, c)| (NodeId(a), NodeId(b), CostEdge::new(c)))
            .collect(),
    )
}

fn ids(raw: &[usize]) -> Vec<NodeId> {
    raw.iter().copied().map(NodeId).collect()
}

// ---------------------------------------------------------------------------
// Page-load shaped graph
// ---------------------------------------------------------------------------
//
//   0 (html, 10)
//   ├─→ 1 (css, 5)    gap 1
//   ├─→ 2 (js, 8)     gap 0
//   │    └─→ 3 (json, 4)   gap 2
//   │         └─→ 4 (img, 6)  gap 1
//   └─→ 5 (font, 3)   gap 20
//
// Longest chain: 0 → 2 → 3 → 4 = 10 + 8 + 2 + 4 + 1 + 6 = 31
// Font branch:   0 → 5         = 10 + 20 + 3          = 33

fn page_load() -> DirectedGraph<CostNode, CostEdge> {
    build(
        &[10.0, 5.0, 8.0, 4.0, 6.0, 3.0],
        &[
            (0, 1, 1.0),
            (0, 2, 0.0),
            (2, 3, 2.0),
            (3, 4, 1.0),
            (0, 5, 20.0),
        ],
    )
}

#[test]
fn page_load_critical_path() {
    let g = page_load();
    let result = g.critical_path(None).expect("cost");
    assert_eq!(result.cost, 33.0);
    assert_eq!(result.path, ids(&[0, 5]));
}

#[test]
fn page_load_rooted_at_script() {
    let g = page_load();
    let result = g.critical_path(Some(&[NodeId(2)])).expect("cost");
    // 8 + 2 + 4 + 1 + 6
    assert_eq!(result.cost, 21.0);
    assert_eq!(result.path, ids(&[2, 3, 4]));
}

#[test]
fn page_load_order_is_fifo_kahn() {
    let g = page_load();
    assert_eq!(
        g.topological_sort(None).expect("sort"),
        ids(&[0, 1, 2, 5, 3, 4])
    );
}

#[test]
fn page_load_ancestors_of_image() {
    let g = page_load();
    assert_eq!(g.ancestor_nodes(&[NodeId(4)]).expect("ancestors"), ids(&[3, 2, 0]));
}

#[test]
fn page_load_roots() {
    assert_eq!(page_load().root_nodes(), ids(&[0]));
}

// ---------------------------------------------------------------------------
// Rewiring changes the critical path
// ---------------------------------------------------------------------------

#[test]
fn rewiring_image_under_font_lengthens_path() {
    let mut g = page_load();
    // Edge 3 is 3 → 4; hang the image under the font instead.
    g.update_edge(EdgeId(3), NodeId(5), NodeId(4)).expect("rewire");

    let result = g.critical_path(None).expect("cost");
    // 10 + 20 + 3 + 1 + 6
    assert_eq!(result.cost, 40.0);
    assert_eq!(result.path, ids(&[0, 5, 4]));
    assert!(g.out_edges(NodeId(3)).expect("member").is_empty());
}

#[test]
fn overwritten_node_cost_is_used() {
    let mut g = page_load();
    g.node_mut(NodeId(1)).expect("member").cost = 100.0;
    let result = g.critical_path(None).expect("cost");
    assert_eq!(result.cost, 111.0);
    assert_eq!(result.path, ids(&[0, 1]));
}

// ---------------------------------------------------------------------------
// Misuse
// ---------------------------------------------------------------------------

#[test]
fn unknown_root_fails_loudly() {
    let g = page_load();
    assert!(matches!(
        g.cost(Some(&[NodeId(42)])),
        Err(GraphError::UnknownNode(NodeId(42)))
    ));
    assert!(matches!(
        g.topological_sort(Some(&[NodeId(42)])),
        Err(GraphError::UnknownNode(NodeId(42)))
    ));
}

#[test]
fn unknown_descendant_fails_loudly() {
    let g = page_load();
    assert!(matches!(
        g.ancestor_nodes(&[NodeId(6)]),
        Err(GraphError::UnknownNode(NodeId(6)))
    ));
}
