//! Properties that hold for every buildable graph.

use proptest::{collection::vec, prelude::*};

use arbor::{
    DiagramOptions, Direction, EdgeSpec, Graph, GraphBuilder, Member, Pipeline, config::AppConfig,
    geometry::{Bounds, Point},
};

/// Shape of a random graph. Clusters only nest under earlier clusters.
#[derive(Debug, Clone)]
struct GraphSpec {
    direction: Direction,
    /// Parent cluster of every cluster, `None` for top level.
    cluster_parents: Vec<Option<usize>>,
    /// Cluster of every node, `None` for the root.
    node_clusters: Vec<Option<usize>>,
    edges: Vec<(usize, usize)>,
}

prop_compose! {
    fn graph_spec()(
        raw_parents in vec(any::<usize>(), 0..5),
        raw_nodes in vec(any::<usize>(), 1..12),
        raw_edges in vec((any::<usize>(), any::<usize>()), 0..16),
        left_right in any::<bool>(),
    ) -> GraphSpec {
        let cluster_parents: Vec<Option<usize>> = raw_parents
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let choice = raw % (index + 1);
                (choice < index).then_some(choice)
            })
            .collect();

        let cluster_count = cluster_parents.len();
        let node_clusters: Vec<Option<usize>> = raw_nodes
            .iter()
            .map(|raw| {
                let choice = raw % (cluster_count + 1);
                (choice < cluster_count).then_some(choice)
            })
            .collect();

        let node_count = node_clusters.len();
        let edges = raw_edges
            .iter()
            .map(|(a, b)| (a % node_count, b % node_count))
            .collect();

        GraphSpec {
            direction: if left_right { Direction::LeftRight } else { Direction::TopDown },
            cluster_parents,
            node_clusters,
            edges,
        }
    }
}

fn build(spec: &GraphSpec, extra_in: Option<usize>) -> Graph {
    let options = DiagramOptions::new("Property", spec.direction, "property.svg");
    let mut builder = GraphBuilder::new(options).unwrap();

    for (index, parent) in spec.cluster_parents.iter().enumerate() {
        let id = format!("c{index}");
        let mut scope = match parent {
            Some(parent) => builder
                .enter_cluster_in(&id, &id, &format!("c{parent}"))
                .unwrap(),
            None => builder.enter_cluster(&id, &id).unwrap(),
        };

        for (node, cluster) in spec.node_clusters.iter().enumerate() {
            if *cluster == Some(index) {
                scope
                    .declare_node(&format!("n{node}"), &format!("node {node}"), None)
                    .unwrap();
            }
        }
        if extra_in == Some(index) {
            scope.declare_node("extra", "extra node", None).unwrap();
        }
    }

    for (node, cluster) in spec.node_clusters.iter().enumerate() {
        if cluster.is_none() {
            builder
                .declare_node(&format!("n{node}"), &format!("node {node}"), None)
                .unwrap();
        }
    }

    for (source, target) in &spec.edges {
        builder
            .declare_edge(EdgeSpec::new(format!("n{source}"), format!("n{target}")))
            .unwrap();
    }

    builder.build().unwrap()
}

fn pipeline() -> Pipeline {
    Pipeline::new(AppConfig::default()).unwrap()
}

/// Start and end of `bounds` along the flow axis.
fn main_span(bounds: Bounds, direction: Direction) -> (f32, f32) {
    (
        direction.main(Point::new(bounds.min_x(), bounds.min_y())),
        direction.main(Point::new(bounds.max_x(), bounds.max_y())),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_cluster_depth_matches_declaration(spec in graph_spec()) {
        let graph = build(&spec, None);
        let layout = pipeline().layout(&graph);

        let mut expected = Vec::with_capacity(spec.cluster_parents.len());
        for parent in &spec.cluster_parents {
            let depth = parent.map_or(1, |parent: usize| expected[parent] + 1);
            expected.push(depth);
        }

        for (index, depth) in expected.iter().enumerate() {
            let id = graph.find_cluster(&format!("c{index}")).unwrap();
            prop_assert_eq!(layout.cluster(id).depth(), *depth);
        }
    }

    #[test]
    fn test_siblings_never_overlap(spec in graph_spec()) {
        let graph = build(&spec, None);
        let layout = pipeline().layout(&graph);

        for (cluster_id, cluster) in graph.clusters() {
            let parent = layout.cluster(cluster_id).bounds();
            let members: Vec<Bounds> = cluster
                .members()
                .iter()
                .map(|member| match member {
                    Member::Node(id) => layout.node(id).unwrap().bounds(),
                    Member::Cluster(child) => layout.cluster(*child).bounds(),
                })
                .collect();

            for (i, a) in members.iter().enumerate() {
                prop_assert!(parent.contains(a), "{a:?} escapes {parent:?}");
                for b in &members[i + 1..] {
                    prop_assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_adding_a_node_keeps_other_cluster_sizes(
        spec in graph_spec(),
        raw_target in any::<usize>(),
    ) {
        prop_assume!(!spec.cluster_parents.is_empty());
        let target = raw_target % spec.cluster_parents.len();

        let before = build(&spec, None);
        let after = build(&spec, Some(target));
        let pipeline = pipeline();
        let (layout_before, layout_after) = (pipeline.layout(&before), pipeline.layout(&after));

        let target_id = after.find_cluster(&format!("c{target}")).unwrap();
        for (cluster_id, _) in after.clusters() {
            if after.is_ancestor(cluster_id, target_id) {
                continue;
            }
            prop_assert_eq!(
                layout_before.cluster(cluster_id).bounds().to_size(),
                layout_after.cluster(cluster_id).bounds().to_size()
            );
        }
    }

    #[test]
    fn test_removing_an_edge_keeps_its_nodes(spec in graph_spec()) {
        let graph = build(&spec, None);

        for index in 0..graph.edges().len() {
            let mut trimmed = graph.clone();
            let removed = trimmed.remove_edge(index).unwrap();

            prop_assert_eq!(trimmed.node_count(), graph.node_count());
            prop_assert_eq!(trimmed.edges().len(), graph.edges().len() - 1);
            prop_assert!(trimmed.contains_node(removed.source()));
            prop_assert!(trimmed.contains_node(removed.target()));
        }
    }

    #[test]
    fn test_every_node_is_rendered_once(spec in graph_spec()) {
        let graph = build(&spec, None);
        let svg = pipeline().render_svg(&graph);

        prop_assert_eq!(svg.matches("data-node-id=").count(), graph.node_count());
        prop_assert_eq!(svg.matches("data-edge=").count(), graph.edges().len());
    }

    #[test]
    fn test_nodes_keep_cluster_padding(spec in graph_spec()) {
        let graph = build(&spec, None);
        let pipeline = pipeline();
        let padding = pipeline.config().layout().cluster_padding();
        let layout = pipeline.layout(&graph);

        for node in graph.nodes() {
            let inner = layout.node(node.id()).unwrap().bounds();
            let outer = layout.cluster(node.cluster()).bounds();

            prop_assert!(inner.min_x() - outer.min_x() >= padding - 1e-3, "{inner:?} in {outer:?}");
            prop_assert!(inner.min_y() - outer.min_y() >= padding - 1e-3, "{inner:?} in {outer:?}");
            prop_assert!(outer.max_x() - inner.max_x() >= padding - 1e-3, "{inner:?} in {outer:?}");
            prop_assert!(outer.max_y() - inner.max_y() >= padding - 1e-3, "{inner:?} in {outer:?}");
        }
    }

    #[test]
    fn test_edges_with_the_flow_point_forward(spec in graph_spec()) {
        let graph = build(&spec, None);
        let layout = pipeline().layout(&graph);
        let direction = graph.direction();

        for (index, edge) in graph.edges().iter().enumerate() {
            if layout.runs_against_flow(index) {
                continue;
            }
            let source = main_span(layout.node(edge.source()).unwrap().bounds(), direction);
            let target = main_span(layout.node(edge.target()).unwrap().bounds(), direction);
            prop_assert!(
                source.1 < target.0,
                "edge {index} {} -> {} runs from {source:?} to {target:?}",
                edge.source(),
                edge.target()
            );
        }
    }

    #[test]
    fn test_warnings_only_for_node_cycles(spec in graph_spec()) {
        let graph = build(&spec, None);
        let layout = pipeline().layout(&graph);

        // Dropping every flagged edge leaves a graph with no warnings at all.
        let mut acyclic = graph.clone();
        for warning in layout.warnings().iter().rev() {
            acyclic.remove_edge(warning.edge_index);
        }
        let relaid = pipeline().layout(&acyclic);
        prop_assert!(relaid.warnings().is_empty());
        for index in 0..acyclic.edges().len() {
            prop_assert!(!relaid.is_back_edge(index));
        }
    }
}
