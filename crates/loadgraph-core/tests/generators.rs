use loadgraph_core::{CostEdge, CostNode, DirectedGraph, NodeId};
use proptest::prelude::*;

pub type Plain = DirectedGraph<CostNode, CostEdge>;

/// Raw description of a DAG: node costs plus forward-only `(from, to, cost)` edges.
#[derive(Debug, Clone)]
pub struct DagShape {
    pub costs: Vec<f64>,
    pub edges: Vec<(usize, usize, f64)>,
}

impl DagShape {
    pub fn build(&self) -> Plain {
        DirectedGraph::new(
            self.costs.iter().copied().map(CostNode::new).collect(),
            self.edges
                .iter()
                .map(|&(a, b, c)| (NodeId(a), NodeId(b), CostEdge::new(c)))
                .collect(),
        )
    }
}

// Integral costs keep every sum exact.
pub fn arb_cost() -> impl Strategy<Value = f64> + Clone {
    (0u32..20).prop_map(f64::from)
}

pub fn arb_dag() -> impl Strategy<Value = DagShape> {
    (1usize..12).prop_flat_map(|n| {
        (
            prop::collection::vec(arb_cost(), n),
            prop::collection::vec((0..n, 0..n, arb_cost()), 0..(n * 2)),
        )
            .prop_map(|(costs, raw)| {
                // Orient every edge from the lower to the higher index.
                let edges = raw
                    .into_iter()
                    .filter(|(a, b, _)| a != b)
                    .map(|(a, b, c)| (a.min(b), a.max(b), c))
                    .collect();
                DagShape { costs, edges }
            })
    })
}
