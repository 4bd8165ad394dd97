//! Ordering and reachability queries.
//!
//! # Edge Direction
//!
//! An edge `A → B` means "B depends on A". Reachability follows out-edges
//! (dependents), ancestry follows in-edges (dependencies).

use std::collections::VecDeque;

use crate::element::{Edge, Node, NodeId};
use crate::error::GraphError;

use super::DirectedGraph;

impl<N: Node, E: Edge> DirectedGraph<N, E> {
    /// Kahn's topological sort.
    ///
    /// With `roots`, only nodes reachable from them are considered and only
    /// edges with both endpoints in that set count towards in-degrees.
    /// Zero in-degree nodes are processed first-in first-out.
    ///
    /// Nodes on a cycle, and everything downstream of one, are never
    /// emitted; the result is then shorter than the domain. Use
    /// [`Self::checked_topological_sort`] to detect that case.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if a root is not a member.
    pub fn topological_sort(&self, roots: Option<&[NodeId]>) -> Result<Vec<NodeId>, GraphError> {
        let domain = self.domain(roots)?;
        Ok(self.sort_domain(&domain).0)
    }

    /// Like [`Self::topological_sort`], but fails when the ordering is
    /// incomplete.
    ///
    /// # Errors
    ///
    /// - [`GraphError::UnknownNode`] if a root is not a member.
    /// - [`GraphError::Cycle`] listing the domain nodes that could not be
    ///   ordered.
    pub fn checked_topological_sort(
        &self,
        roots: Option<&[NodeId]>,
    ) -> Result<Vec<NodeId>, GraphError> {
        let domain = self.domain(roots)?;
        let (sorted, _) = self.sort_domain(&domain);
        if sorted.len() == domain.len() {
            return Ok(sorted);
        }

        let mut emitted = vec![false; self.node_count()];
        for n in &sorted {
            emitted[n.0] = true;
        }
        let mut unsorted: Vec<NodeId> = domain.into_iter().filter(|n| !emitted[n.0]).collect();
        unsorted.sort_unstable();
        Err(GraphError::Cycle { unsorted })
    }

    /// Nodes reachable from `roots` through out-edges, in BFS discovery
    /// order.
    ///
    /// Any node for which `should_stop` returns `true` is excluded and not
    /// expanded; this applies to the roots themselves too.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if a root is not a member.
    pub fn reachable_nodes<F>(&self, roots: &[NodeId], mut should_stop: F) -> Result<Vec<NodeId>, GraphError>
    where
        F: FnMut(NodeId, &N) -> bool,
    {
        self.check_members(roots)?;

        let mut seen = vec![false; self.node_count()];
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        let mut reached = Vec::new();

        for &root in roots {
            if seen[root.0] {
                continue;
            }
            seen[root.0] = true;
            if should_stop(root, &self.nodes[root.0]) {
                continue;
            }
            reached.push(root);
            queue.push_back(root);
        }

        while let Some(current) = queue.pop_front() {
            for &edge in self.outgoing(current) {
                let (_, next, _) = self.slot(edge);
                if seen[next.0] {
                    continue;
                }
                seen[next.0] = true;
                if should_stop(next, &self.nodes[next.0]) {
                    continue;
                }
                reached.push(next);
                queue.push_back(next);
            }
        }

        Ok(reached)
    }

    /// Strict ancestors of `descendants`, in BFS discovery order.
    ///
    /// The walk follows in-edges. No element of `descendants` is ever part
    /// of the result, even when one descendant is an ancestor of another.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if a descendant is not a member.
    pub fn ancestor_nodes(&self, descendants: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
        self.check_members(descendants)?;

        let mut excluded = vec![false; self.node_count()];
        let mut seen = vec![false; self.node_count()];
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        for &d in descendants {
            excluded[d.0] = true;
            if !seen[d.0] {
                seen[d.0] = true;
                queue.push_back(d);
            }
        }

        let mut ancestors = Vec::new();
        while let Some(current) = queue.pop_front() {
            for &edge in self.incoming(current) {
                let (prev, _, _) = self.slot(edge);
                if seen[prev.0] {
                    continue;
                }
                seen[prev.0] = true;
                if !excluded[prev.0] {
                    ancestors.push(prev);
                }
                queue.push_back(prev);
            }
        }

        Ok(ancestors)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn check_members(&self, nodes: &[NodeId]) -> Result<(), GraphError> {
        match nodes.iter().find(|n| !self.contains_node(**n)) {
            Some(&missing) => Err(GraphError::UnknownNode(missing)),
            None => Ok(()),
        }
    }

    /// Nodes considered by `topological_sort` and `cost` for `roots`.
    pub(crate) fn domain(&self, roots: Option<&[NodeId]>) -> Result<Vec<NodeId>, GraphError> {
        match roots {
            Some(roots) => self.reachable_nodes(roots, |_, _| false),
            None => Ok(self.node_ids().collect()),
        }
    }

    /// Kahn's algorithm restricted to `domain`.
    ///
    /// Returns the emitted order together with the domain membership mask.
    pub(crate) fn sort_domain(&self, domain: &[NodeId]) -> (Vec<NodeId>, Vec<bool>) {
        let mut in_domain = vec![false; self.node_count()];
        for n in domain {
            in_domain[n.0] = true;
        }

        let mut in_degree = vec![0_usize; self.node_count()];
        for &n in domain {
            in_degree[n.0] = self
                .incoming(n)
                .iter()
                .filter(|&&e| {
                    let (from, _, _) = self.slot(e);
                    in_domain[from.0]
                })
                .count();
        }

        let mut queue: VecDeque<NodeId> = domain
            .iter()
            .copied()
            .filter(|n| in_degree[n.0] == 0)
            .collect();
        let mut sorted = Vec::with_capacity(domain.len());

        while let Some(current) = queue.pop_front() {
            sorted.push(current);
            for &edge in self.outgoing(current) {
                let (_, next, _) = self.slot(edge);
                if !in_domain[next.0] {
                    continue;
                }
                in_degree[next.0] -= 1;
                if in_degree[next.0] == 0 {
                    queue.push_back(next);
                }
            }
        }

        (sorted, in_domain)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::element::{CostEdge, CostNode, NodeId};
    use crate::error::GraphError;
    use crate::graph::DirectedGraph;

    fn unit_graph(n: usize, edges: &[(usize, usize)]) -> DirectedGraph<CostNode, CostEdge> {
        DirectedGraph::new(
            vec![CostNode::new(1.0); n],
            edges
                .iter()
                .map(|&(a, b)| (NodeId(a), NodeId(b), CostEdge::default()))
                .collect(),
        )
    }

    fn ids(raw: &[usize]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId).collect()
    }

    #[test]
    fn empty_graph_sorts_to_nothing() {
        let g = unit_graph(0, &[]);
        assert!(g.topological_sort(None).expect("sort").is_empty());
        assert!(g.reachable_nodes(&[], |_, _| false).expect("reach").is_empty());
    }

    #[test]
    fn diamond_sort_is_fifo() {
        // 0 → 1 → 3, 0 → 2 → 3
        let g = unit_graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        assert_eq!(g.topological_sort(None).expect("sort"), ids(&[0, 1, 2, 3]));
    }

    #[test]
    fn rooted_sort_ignores_unreachable_parents() {
        // 4 → 2 is outside the domain rooted at 0, so it must not hold 2 back.
        let g = unit_graph(5, &[(0, 1), (1, 2), (4, 2), (3, 4)]);
        assert_eq!(
            g.topological_sort(Some(&[NodeId(0)])).expect("sort"),
            ids(&[0, 1, 2])
        );
    }

    #[test]
    fn cycle_nodes_are_not_emitted() {
        // 0 → 1 ⇄ 2 → 3
        let g = unit_graph(4, &[(0, 1), (1, 2), (2, 1), (2, 3)]);
        assert_eq!(g.topological_sort(None).expect("sort"), ids(&[0]));
    }

    #[test]
    fn checked_sort_reports_unsorted_nodes() {
        let g = unit_graph(4, &[(0, 1), (1, 2), (2, 1), (2, 3)]);
        match g.checked_topological_sort(None) {
            Err(GraphError::Cycle { unsorted }) => assert_eq!(unsorted, ids(&[1, 2, 3])),
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn self_loop_counts_as_cycle() {
        let g = unit_graph(2, &[(0, 1), (1, 1)]);
        assert!(matches!(
            g.checked_topological_sort(None),
            Err(GraphError::Cycle { .. })
        ));
    }

    #[test]
    fn reachable_stops_at_predicate() {
        // 0 → 1 → 2, 0 → 3
        let g = unit_graph(4, &[(0, 1), (1, 2), (0, 3)]);
        let reached = g
            .reachable_nodes(&[NodeId(0)], |n, _| n == NodeId(1))
            .expect("reach");
        assert_eq!(reached, ids(&[0, 3]));
    }

    #[test]
    fn stopped_root_is_excluded() {
        let g = unit_graph(2, &[(0, 1)]);
        let reached = g
            .reachable_nodes(&[NodeId(0)], |n, _| n == NodeId(0))
            .expect("reach");
        assert!(reached.is_empty());
    }

    #[test]
    fn reachable_rejects_unknown_root() {
        let g = unit_graph(2, &[(0, 1)]);
        assert!(matches!(
            g.reachable_nodes(&[NodeId(2)], |_, _| false),
            Err(GraphError::UnknownNode(NodeId(2)))
        ));
    }

    #[test]
    fn ancestors_exclude_descendants() {
        // 0 → 1 → 2 → 3
        let g = unit_graph(4, &[(0, 1), (1, 2), (2, 3)]);
        let ancestors = g.ancestor_nodes(&[NodeId(3), NodeId(1)]).expect("ancestors");
        assert_eq!(ancestors, ids(&[2, 0]));
    }

    #[test]
    fn ancestors_of_root_are_empty() {
        let g = unit_graph(3, &[(0, 1), (1, 2)]);
        assert!(g.ancestor_nodes(&[NodeId(0)]).expect("ancestors").is_empty());
    }

    #[test]
    fn ancestors_terminate_on_cycles() {
        let g = unit_graph(3, &[(0, 1), (1, 2), (2, 1)]);
        let mut ancestors = g.ancestor_nodes(&[NodeId(2)]).expect("ancestors");
        ancestors.sort_unstable();
        assert_eq!(ancestors, ids(&[0, 1]));
    }
}
