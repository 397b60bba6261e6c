//! End-to-end scenarios through the public API: build, lay out, route and
//! render.

use arbor::{
    ArborError, DiagramOptions, Direction, EdgeSpec, EdgeStyle, Graph, GraphBuilder, IdKind,
    Pipeline, config::AppConfig,
};

fn builder(direction: Direction) -> GraphBuilder {
    let options = DiagramOptions::new("Test", direction, "test.svg");
    GraphBuilder::new(options).expect("valid options")
}

fn pipeline() -> Pipeline {
    Pipeline::new(AppConfig::default()).expect("default config is valid")
}

fn attribute_values<'a>(svg: &'a str, attribute: &str) -> Vec<&'a str> {
    let needle = format!(r#"{attribute}=""#);
    svg.match_indices(&needle)
        .filter_map(|(start, _)| {
            let rest = &svg[start + needle.len()..];
            rest.find('"').map(|end| &rest[..end])
        })
        .collect()
}

fn chain_graph() -> Graph {
    let mut builder = builder(Direction::TopDown);
    {
        let mut cluster = builder.enter_cluster("group", "Group").unwrap();
        for id in ["A", "B", "C"] {
            cluster.declare_node(id, id, None).unwrap();
        }
        cluster.declare_edge(EdgeSpec::new("A", "B")).unwrap();
        cluster.declare_edge(EdgeSpec::new("B", "C")).unwrap();
    }
    builder.build().unwrap()
}

#[test]
fn test_chain_ranks_and_crossings() {
    let graph = chain_graph();
    let pipeline = pipeline();
    let layout = pipeline.layout(&graph);

    let ranks: Vec<usize> = ["A", "B", "C"]
        .iter()
        .map(|id| layout.node(id).unwrap().rank())
        .collect();
    assert_eq!(ranks, vec![0, 1, 2]);
    assert_eq!(layout.crossings(), 0);
    assert!(layout.warnings().is_empty());

    let routes = pipeline.route(&graph, &layout);
    assert_eq!(routes.len(), 2);

    let svg = pipeline.render_svg(&graph);
    assert_eq!(attribute_values(&svg, "data-edge").len(), 2);
}

#[test]
fn test_duplicate_node_id() {
    let mut builder = builder(Direction::TopDown);
    builder.declare_node("X", "first", None).unwrap();

    let err = builder.declare_node("X", "second", None).unwrap_err();
    match &err {
        ArborError::DuplicateId { kind, id } => {
            assert_eq!(*kind, IdKind::Node);
            assert_eq!(id, "X");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.code(), "arbor::duplicate_id");

    // The builder stays poisoned, so nothing can be rendered.
    assert!(matches!(
        builder.build(),
        Err(ArborError::DuplicateId { .. })
    ));
}

#[test]
fn test_unknown_edge_target() {
    let mut builder = builder(Direction::TopDown);
    builder.declare_node("P", "P", None).unwrap();

    let err = builder.declare_edge(EdgeSpec::new("P", "Q")).unwrap_err();
    match err {
        ArborError::Reference { missing, .. } => assert_eq!(missing, "Q"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_parallel_edges_are_offset() {
    let mut builder = builder(Direction::TopDown);
    builder.declare_node("A", "A", None).unwrap();
    builder.declare_node("B", "B", None).unwrap();
    builder.declare_edge(EdgeSpec::new("A", "B")).unwrap();
    builder
        .declare_edge(EdgeSpec::new("A", "B").with_style(EdgeStyle::new()))
        .unwrap();
    let graph = builder.build().unwrap();

    let pipeline = pipeline();
    let layout = pipeline.layout(&graph);
    let routes = pipeline.route(&graph, &layout);

    assert_eq!(routes.len(), 2);
    assert_ne!(routes[0].points(), routes[1].points());
    assert!(routes[0].start().distance(routes[1].start()) > 1.0);
    assert!(routes[0].end().distance(routes[1].end()) > 1.0);
}

#[test]
fn test_two_cycle_yields_one_warning() {
    let mut builder = builder(Direction::LeftRight);
    builder.declare_node("A", "A", None).unwrap();
    builder.declare_node("B", "B", None).unwrap();
    builder.declare_edge(EdgeSpec::new("A", "B")).unwrap();
    builder.declare_edge(EdgeSpec::new("B", "A")).unwrap();
    let graph = builder.build().unwrap();

    let layout = pipeline().layout(&graph);

    assert_eq!(layout.warnings().len(), 1);
    let warning = &layout.warnings()[0];
    assert_eq!(warning.edge_index, 1);
    assert_eq!(warning.source, "B");
    assert_eq!(warning.target, "A");
    assert!(!layout.is_back_edge(0));
    assert!(layout.is_back_edge(1));
}

#[test]
fn test_path_through_a_cluster_is_not_a_cycle() {
    let mut builder = builder(Direction::TopDown);
    {
        let mut group = builder.enter_cluster("group", "Group").unwrap();
        group.declare_node("a", "A", None).unwrap();
        group.declare_node("b", "B", None).unwrap();
    }
    builder.declare_node("c", "C", None).unwrap();
    builder.declare_edge(EdgeSpec::new("a", "c")).unwrap();
    builder.declare_edge(EdgeSpec::new("c", "b")).unwrap();
    let graph = builder.build().unwrap();

    let pipeline = pipeline();
    let layout = pipeline.layout(&graph);

    assert!(layout.warnings().is_empty());
    assert!(!layout.is_back_edge(0));
    assert!(!layout.is_back_edge(1));
    assert!(!layout.is_folded_edge(0));
    assert!(layout.is_folded_edge(1));

    let routes = pipeline.route(&graph, &layout);
    assert!(routes.iter().all(|route| !route.is_back_edge()));
    let svg = pipeline.render_svg(&graph);
    assert!(!svg.contains("data-back-edge"));
}

#[test]
fn test_unwritable_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("missing").join("out.svg");

    let err = pipeline().render_to_path(&chain_graph(), &target).unwrap_err();
    match &err {
        ArborError::Render { path, .. } => assert_eq!(path, &target),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.code(), "arbor::render");
    assert!(!target.exists());
}

#[test]
fn test_render_to_file_uses_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("chain.svg");

    let mut builder = GraphBuilder::new(DiagramOptions::new("Chain", Direction::TopDown, &target))
        .unwrap();
    builder.declare_node("a", "a", None).unwrap();
    let graph = builder.build().unwrap();

    let layout = pipeline().render_to_file(&graph).unwrap();
    assert!(layout.warnings().is_empty());

    let written = std::fs::read_to_string(&target).unwrap();
    assert!(written.contains("<svg"));
    assert!(written.contains("</svg>"));
}

#[test]
fn test_render_is_deterministic() {
    let graph = chain_graph();
    assert_eq!(pipeline().render_svg(&graph), pipeline().render_svg(&graph));
}

#[test]
fn test_rendered_edges_reference_rendered_nodes() {
    let mut builder = builder(Direction::LeftRight);
    builder.declare_node("lb", "Load balancer", Some("aws/elb")).unwrap();
    {
        let mut cluster = builder.enter_cluster("web", "Web tier").unwrap();
        cluster.declare_node("w1", "web-1", Some("aws/ec2")).unwrap();
        cluster.declare_node("w2", "web-2", Some("aws/ec2")).unwrap();
    }
    builder.declare_node("db", "Database", Some("aws/rds")).unwrap();
    builder
        .declare_chain(&["lb", "w1", "db"], EdgeStyle::new())
        .unwrap();
    builder
        .declare_chain(&["lb", "w2", "db"], EdgeStyle::new())
        .unwrap();
    let graph = builder.build().unwrap();

    let svg = pipeline().render_svg(&graph);
    let nodes = attribute_values(&svg, "data-node-id");
    assert_eq!(nodes.len(), graph.node_count());

    for endpoint in attribute_values(&svg, "data-source")
        .into_iter()
        .chain(attribute_values(&svg, "data-target"))
    {
        assert!(nodes.contains(&endpoint), "edge references {endpoint}");
    }
}

#[test]
fn test_invalid_config_rejected() {
    let layout = arbor::config::LayoutConfig::default().with_node_spacing(0.0);
    let config = AppConfig::new(layout, Default::default(), Default::default());

    let err = Pipeline::new(config).unwrap_err();
    assert!(matches!(err, ArborError::Configuration { .. }));
}
