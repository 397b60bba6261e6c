//! Cycle detection on the node graph and longest-path ranking per scope.

use std::collections::HashMap;

use petgraph::{
    Direction as EdgeDirection,
    algo::{has_path_connecting, toposort},
    graph::{DiGraph, NodeIndex},
};

use crate::model::Graph;

/// An edge of the graph lifted to two items of a scope.
#[derive(Debug, Clone, Copy)]
pub(super) struct ScopeEdge {
    /// Index into `Graph::edges`.
    pub edge: usize,
    pub source: usize,
    pub target: usize,
}

#[derive(Debug, Default)]
pub(super) struct Ranking {
    /// Rank of every item, indexed like the scope's items.
    pub ranks: Vec<usize>,
    /// Accepted edges as item pairs, in declaration order.
    pub dag_edges: Vec<(usize, usize)>,
    /// Graph edge indices left out because their lifted items already
    /// reach each other the other way round.
    pub folded: Vec<usize>,
}

/// Flags every edge that closes a cycle in the node graph.
///
/// Edges are accepted in declaration order. An edge is a back edge when it is
/// a self-loop or when its target already reaches its source through
/// accepted edges.
pub(super) fn find_back_edges(graph: &Graph) -> Vec<bool> {
    let mut dag: DiGraph<&str, usize> =
        DiGraph::with_capacity(graph.node_count(), graph.edges().len());
    let indices: HashMap<&str, NodeIndex> = graph
        .nodes()
        .map(|node| (node.id(), dag.add_node(node.id())))
        .collect();

    graph
        .edges()
        .iter()
        .enumerate()
        .map(|(index, edge)| {
            let (Some(&source), Some(&target)) =
                (indices.get(edge.source()), indices.get(edge.target()))
            else {
                return false;
            };

            if source == target || has_path_connecting(&dag, target, source, None) {
                return true;
            }
            dag.add_edge(source, target, index);
            false
        })
        .collect()
}

/// Ranks `item_count` items connected by `edges`.
///
/// `edges` must not contain back edges of the node graph. An edge whose
/// target item already reaches its source item is folded: it is drawn but
/// does not take part in ranking.
pub(super) fn rank_items(item_count: usize, edges: &[ScopeEdge]) -> Ranking {
    let mut dag: DiGraph<usize, usize> = DiGraph::with_capacity(item_count, edges.len());
    for item in 0..item_count {
        dag.add_node(item);
    }

    let mut dag_edges = Vec::with_capacity(edges.len());
    let mut folded = Vec::new();

    for scope_edge in edges {
        let source = NodeIndex::new(scope_edge.source);
        let target = NodeIndex::new(scope_edge.target);

        if source == target || has_path_connecting(&dag, target, source, None) {
            folded.push(scope_edge.edge);
            continue;
        }

        dag.add_edge(source, target, scope_edge.edge);
        dag_edges.push((scope_edge.source, scope_edge.target));
    }

    let order = toposort(&dag, None).expect("accepted edges never close a cycle");

    let mut ranks = vec![0; item_count];
    for node in order {
        let rank = dag
            .neighbors_directed(node, EdgeDirection::Incoming)
            .map(|pred| ranks[pred.index()] + 1)
            .max()
            .unwrap_or(0);
        ranks[node.index()] = rank;
    }

    Ranking {
        ranks,
        dag_edges,
        folded,
    }
}
