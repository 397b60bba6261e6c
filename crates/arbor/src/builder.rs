//! Declarative construction of a [`Graph`].
//!
//! The builder keeps an explicit stack of open clusters. Entering a cluster
//! returns a [`ClusterScope`] guard that derefs to the builder; everything
//! declared through the guard lands in that cluster, and dropping the guard
//! closes it again, on every exit path.
//!
//! ```
//! use arbor::{DiagramOptions, Direction, EdgeSpec, GraphBuilder};
//!
//! # fn main() -> Result<(), arbor::ArborError> {
//! let mut builder = GraphBuilder::new(DiagramOptions::new(
//!     "Web service",
//!     Direction::LeftRight,
//!     "web.svg",
//! ))?;
//! builder.declare_node("user", "User", Some("onprem.client.user"))?;
//! {
//!     let mut cluster = builder.enter_cluster("backend", "Backend")?;
//!     cluster.declare_node("api", "API", Some("aws.compute.ec2"))?;
//! }
//! builder.declare_edge(EdgeSpec::new("user", "api").with_label("HTTPS"))?;
//!
//! let graph = builder.build()?;
//! assert_eq!(graph.node_count(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! The first failing operation poisons the builder: every later operation and
//! [`GraphBuilder::build`] return a copy of that error.

use std::{
    collections::HashMap,
    ops::{Deref, DerefMut},
};

use indexmap::IndexMap;
use log::{debug, info, trace};

use crate::{
    error::{ArborError, IdKind},
    model::{Cluster, ClusterId, DiagramOptions, Edge, EdgeStyle, Graph, Member, Node},
};

/// Description of an edge to declare.
#[derive(Debug, Clone)]
pub struct EdgeSpec {
    source: String,
    target: String,
    label: Option<String>,
    style: EdgeStyle,
}

impl EdgeSpec {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: None,
            style: EdgeStyle::default(),
        }
    }

    /// Sets the edge label. An empty label is treated as no label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.label = (!label.is_empty()).then_some(label);
        self
    }

    pub fn with_style(mut self, style: EdgeStyle) -> Self {
        self.style = style;
        self
    }
}

/// Builds a [`Graph`] from enter-cluster, declare-node and declare-edge
/// operations.
#[derive(Debug)]
pub struct GraphBuilder {
    options: DiagramOptions,
    clusters: Vec<Cluster>,
    cluster_ids: HashMap<String, ClusterId>,
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
    /// Open clusters, the root at the bottom.
    stack: Vec<ClusterId>,
    poisoned: Option<ArborError>,
}

impl GraphBuilder {
    /// Starts a new diagram.
    ///
    /// # Errors
    ///
    /// Returns [`ArborError::Configuration`] if the output path is empty.
    pub fn new(options: DiagramOptions) -> Result<Self, ArborError> {
        if options.output_path().as_os_str().is_empty() {
            return Err(ArborError::configuration(
                "output_path",
                "the output path must not be empty",
            ));
        }

        info!(title = options.title(), direction:% = options.direction(); "Starting graph build");

        let root = Cluster::root(options.title());
        Ok(Self {
            options,
            clusters: vec![root],
            cluster_ids: HashMap::new(),
            nodes: IndexMap::new(),
            edges: Vec::new(),
            stack: vec![ClusterId::ROOT],
            poisoned: None,
        })
    }

    /// The cluster that new declarations attach to.
    pub fn current_cluster(&self) -> ClusterId {
        self.stack.last().copied().unwrap_or(ClusterId::ROOT)
    }

    /// Opens a cluster nested in the current one.
    ///
    /// # Errors
    ///
    /// [`ArborError::DuplicateId`] if `id` is already a node or cluster id,
    /// [`ArborError::Configuration`] if `id` is empty.
    pub fn enter_cluster(&mut self, id: &str, label: &str) -> Result<ClusterScope<'_>, ArborError> {
        let parent = self.current_cluster();
        self.enter_cluster_under(id, label, parent)
    }

    /// Opens a cluster nested in the existing cluster `parent`.
    ///
    /// # Errors
    ///
    /// As [`enter_cluster`](Self::enter_cluster), plus
    /// [`ArborError::Reference`] if `parent` is not a declared cluster.
    pub fn enter_cluster_in(
        &mut self,
        id: &str,
        label: &str,
        parent: &str,
    ) -> Result<ClusterScope<'_>, ArborError> {
        let parent_id = self.guard(|builder| {
            builder
                .cluster_ids
                .get(parent)
                .copied()
                .ok_or_else(|| ArborError::Reference {
                    missing: parent.to_string(),
                    context: format!("parent of cluster `{id}`"),
                })
        })?;
        self.enter_cluster_under(id, label, parent_id)
    }

    fn enter_cluster_under(
        &mut self,
        id: &str,
        label: &str,
        parent: ClusterId,
    ) -> Result<ClusterScope<'_>, ArborError> {
        let cluster_id = self.guard(|builder| {
            builder.check_new_id(id, IdKind::Cluster)?;

            let cluster_id = ClusterId::new(builder.clusters.len());
            let depth = builder.clusters[parent.index()].depth() + 1;
            builder
                .clusters
                .push(Cluster::new(id.to_string(), label.to_string(), parent, depth));
            builder.clusters[parent.index()].push_member(Member::Cluster(cluster_id));
            builder.cluster_ids.insert(id.to_string(), cluster_id);

            trace!(cluster = id, depth; "Cluster entered");
            Ok(cluster_id)
        })?;

        let depth = self.stack.len();
        self.stack.push(cluster_id);
        Ok(ClusterScope {
            builder: self,
            depth,
            cluster: cluster_id,
        })
    }

    /// Declares a node in the current cluster.
    ///
    /// An empty `label` declares a blank node; an empty `icon` is the same as
    /// no icon.
    ///
    /// # Errors
    ///
    /// [`ArborError::DuplicateId`] on a reused id, [`ArborError::Configuration`]
    /// on an empty id.
    pub fn declare_node(
        &mut self,
        id: &str,
        label: &str,
        icon: Option<&str>,
    ) -> Result<(), ArborError> {
        self.guard(|builder| {
            builder.check_new_id(id, IdKind::Node)?;

            let cluster = builder.current_cluster();
            let icon = icon.filter(|icon| !icon.is_empty()).map(str::to_string);
            builder.nodes.insert(
                id.to_string(),
                Node::new(id.to_string(), label.to_string(), icon, cluster),
            );
            builder.clusters[cluster.index()].push_member(Member::Node(id.to_string()));

            trace!(node = id, cluster = cluster.index(); "Node declared");
            Ok(())
        })
    }

    /// Declares an edge between two already declared nodes.
    ///
    /// # Errors
    ///
    /// [`ArborError::Reference`] naming the first endpoint (source, then
    /// target) that is not a declared node.
    pub fn declare_edge(&mut self, spec: EdgeSpec) -> Result<(), ArborError> {
        self.guard(|builder| {
            for endpoint in [&spec.source, &spec.target] {
                if !builder.nodes.contains_key(endpoint.as_str()) {
                    return Err(ArborError::Reference {
                        missing: endpoint.clone(),
                        context: format!("edge `{}` -> `{}`", spec.source, spec.target),
                    });
                }
            }

            let multiplicity = builder
                .edges
                .iter()
                .filter(|edge| edge.source() == spec.source && edge.target() == spec.target)
                .count();

            trace!(source = spec.source, target = spec.target, multiplicity; "Edge declared");
            builder.edges.push(Edge::new(
                spec.source,
                spec.target,
                spec.label,
                spec.style,
                multiplicity,
            ));
            Ok(())
        })
    }

    /// Declares edges `ids[0] -> ids[1] -> ... -> ids[n-1]`, all with `style`.
    ///
    /// # Errors
    ///
    /// [`ArborError::Configuration`] if fewer than two ids are given, otherwise
    /// as [`declare_edge`](Self::declare_edge).
    pub fn declare_chain(&mut self, ids: &[&str], style: EdgeStyle) -> Result<(), ArborError> {
        self.guard(|_| {
            if ids.len() < 2 {
                return Err(ArborError::configuration(
                    "chain",
                    format!("a chain needs at least two nodes, got {}", ids.len()),
                ));
            }
            Ok(())
        })?;

        for pair in ids.windows(2) {
            self.declare_edge(EdgeSpec::new(pair[0], pair[1]).with_style(style.clone()))?;
        }
        Ok(())
    }

    /// Finishes the build.
    ///
    /// # Errors
    ///
    /// The first error any earlier operation returned.
    pub fn build(self) -> Result<Graph, ArborError> {
        if let Some(err) = self.poisoned {
            return Err(err);
        }

        debug!(
            nodes = self.nodes.len(),
            clusters = self.clusters.len(),
            edges = self.edges.len();
            "Graph built"
        );
        Ok(Graph::new(self.options, self.clusters, self.nodes, self.edges))
    }

    fn check_new_id(&self, id: &str, kind: IdKind) -> Result<(), ArborError> {
        if id.is_empty() {
            return Err(ArborError::configuration(
                format!("{kind} id"),
                "ids must not be empty",
            ));
        }
        if self.nodes.contains_key(id) || self.cluster_ids.contains_key(id) {
            return Err(ArborError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Runs `op` unless the builder is poisoned, and poisons it if `op` fails.
    fn guard<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, ArborError>,
    ) -> Result<T, ArborError> {
        if let Some(err) = &self.poisoned {
            return Err(err.clone());
        }
        op(self).inspect_err(|err| {
            debug!(code = err.code(), err:%; "Graph builder poisoned");
            self.poisoned = Some(err.clone());
        })
    }
}

/// Guard for an open cluster.
///
/// Derefs to the [`GraphBuilder`]; dropping it closes the cluster.
#[derive(Debug)]
pub struct ClusterScope<'b> {
    builder: &'b mut GraphBuilder,
    depth: usize,
    cluster: ClusterId,
}

impl ClusterScope<'_> {
    /// The cluster opened by this scope.
    pub fn id(&self) -> ClusterId {
        self.cluster
    }

    /// Closes the cluster explicitly.
    pub fn exit(self) {}
}

impl Deref for ClusterScope<'_> {
    type Target = GraphBuilder;

    fn deref(&self) -> &Self::Target {
        self.builder
    }
}

impl DerefMut for ClusterScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.builder
    }
}

impl Drop for ClusterScope<'_> {
    fn drop(&mut self) {
        self.builder.stack.truncate(self.depth);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::model::Direction;

    fn builder() -> GraphBuilder {
        GraphBuilder::new(DiagramOptions::new("Test", Direction::TopDown, "out.svg")).unwrap()
    }

    #[test]
    fn test_empty_output_path_is_rejected() {
        let err = GraphBuilder::new(DiagramOptions::new("t", Direction::TopDown, PathBuf::new()))
            .unwrap_err();
        assert_eq!(err.code(), "arbor::configuration");
    }

    #[test]
    fn test_scope_guard_restores_parent() {
        let mut builder = builder();
        {
            let mut outer = builder.enter_cluster("outer", "Outer").unwrap();
            let outer_id = outer.id();
            {
                let mut inner = outer.enter_cluster("inner", "Inner").unwrap();
                inner.declare_node("deep", "Deep", None).unwrap();
            }
            assert_eq!(outer.current_cluster(), outer_id);
            outer.declare_node("shallow", "Shallow", None).unwrap();
        }
        assert_eq!(builder.current_cluster(), ClusterId::ROOT);
        builder.declare_node("top", "Top", None).unwrap();

        let graph = builder.build().unwrap();
        let outer = graph.find_cluster("outer").unwrap();
        let inner = graph.find_cluster("inner").unwrap();
        assert_eq!(graph.node("deep").unwrap().cluster(), inner);
        assert_eq!(graph.node("shallow").unwrap().cluster(), outer);
        assert_eq!(graph.node("top").unwrap().cluster(), ClusterId::ROOT);
        assert_eq!(graph.cluster(inner).depth(), 2);
        assert_eq!(graph.cluster(inner).parent(), Some(outer));
    }

    #[test]
    fn test_scope_guard_pops_on_error_propagation() {
        fn fill(builder: &mut GraphBuilder) -> Result<(), ArborError> {
            let mut scope = builder.enter_cluster("c", "C")?;
            scope.declare_node("n", "N", None)?;
            scope.declare_edge(EdgeSpec::new("n", "ghost"))?;
            Ok(())
        }

        let mut builder = builder();
        assert!(fill(&mut builder).is_err());
        assert_eq!(builder.current_cluster(), ClusterId::ROOT);
    }

    #[test]
    fn test_explicit_exit() {
        let mut builder = builder();
        let scope = builder.enter_cluster("c", "C").unwrap();
        scope.exit();
        assert_eq!(builder.current_cluster(), ClusterId::ROOT);
    }

    #[test]
    fn test_enter_cluster_in_named_parent() {
        let mut builder = builder();
        builder.enter_cluster("vpc", "VPC").unwrap().exit();
        {
            let mut subnet = builder.enter_cluster_in("subnet", "Subnet", "vpc").unwrap();
            subnet.declare_node("ec2", "EC2", None).unwrap();
        }
        let graph = builder.build().unwrap();
        let vpc = graph.find_cluster("vpc").unwrap();
        let subnet = graph.find_cluster("subnet").unwrap();
        assert_eq!(graph.cluster(subnet).parent(), Some(vpc));
        assert_eq!(graph.cluster(vpc).members(), &[Member::Cluster(subnet)]);
    }

    #[test]
    fn test_enter_cluster_in_unknown_parent() {
        let mut builder = builder();
        let err = builder.enter_cluster_in("x", "X", "nope").unwrap_err();
        match err {
            ArborError::Reference { missing, .. } => assert_eq!(missing, "nope"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_ids_share_namespace() {
        let mut builder = builder();
        builder.declare_node("x", "X", None).unwrap();
        let err = builder.enter_cluster("x", "X").unwrap_err();
        assert!(matches!(
            err,
            ArborError::DuplicateId { kind: IdKind::Cluster, ref id } if id == "x"
        ));
    }

    #[test]
    fn test_empty_id_is_configuration_error() {
        let mut builder = builder();
        let err = builder.declare_node("", "Nameless", None).unwrap_err();
        assert_eq!(err.code(), "arbor::configuration");
    }

    #[test]
    fn test_first_error_poisons_builder() {
        let mut builder = builder();
        builder.declare_node("a", "A", None).unwrap();
        let first = builder.declare_edge(EdgeSpec::new("a", "b")).unwrap_err();

        // A perfectly valid operation now fails with the same error.
        let second = builder.declare_node("c", "C", None).unwrap_err();
        assert_eq!(first.to_string(), second.to_string());

        let from_build = builder.build().unwrap_err();
        assert_eq!(first.to_string(), from_build.to_string());
    }

    #[test]
    fn test_edge_reference_checks_source_first() {
        let mut builder = builder();
        let err = builder.declare_edge(EdgeSpec::new("p", "q")).unwrap_err();
        match err {
            ArborError::Reference { missing, .. } => assert_eq!(missing, "p"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parallel_edges_get_multiplicity() {
        let mut builder = builder();
        builder.declare_node("a", "A", None).unwrap();
        builder.declare_node("b", "B", None).unwrap();
        builder.declare_edge(EdgeSpec::new("a", "b")).unwrap();
        builder.declare_edge(EdgeSpec::new("b", "a")).unwrap();
        builder.declare_edge(EdgeSpec::new("a", "b")).unwrap();

        let graph = builder.build().unwrap();
        let multiplicities: Vec<usize> = graph.edges().iter().map(Edge::multiplicity).collect();
        assert_eq!(multiplicities, vec![0, 0, 1]);
    }

    #[test]
    fn test_declare_chain() {
        let mut builder = builder();
        for id in ["a", "b", "c"] {
            builder.declare_node(id, id, None).unwrap();
        }
        builder
            .declare_chain(&["a", "b", "c"], EdgeStyle::default())
            .unwrap();
        let graph = builder.build().unwrap();
        let pairs: Vec<(&str, &str)> = graph
            .edges()
            .iter()
            .map(|edge| (edge.source(), edge.target()))
            .collect();
        assert_eq!(pairs, vec![("a", "b"), ("b", "c")]);
    }

    #[test]
    fn test_short_chain_is_rejected() {
        let mut builder = builder();
        builder.declare_node("a", "A", None).unwrap();
        let err = builder
            .declare_chain(&["a"], EdgeStyle::default())
            .unwrap_err();
        assert_eq!(err.code(), "arbor::configuration");
    }

    #[test]
    fn test_remove_edge_keeps_nodes_and_renumbers() {
        let mut builder = builder();
        builder.declare_node("a", "A", None).unwrap();
        builder.declare_node("b", "B", None).unwrap();
        for _ in 0..3 {
            builder.declare_edge(EdgeSpec::new("a", "b")).unwrap();
        }
        let mut graph = builder.build().unwrap();

        let removed = graph.remove_edge(0).unwrap();
        assert_eq!(removed.multiplicity(), 0);
        assert!(graph.contains_node("a"));
        assert!(graph.contains_node("b"));
        let multiplicities: Vec<usize> = graph.edges().iter().map(Edge::multiplicity).collect();
        assert_eq!(multiplicities, vec![0, 1]);
        assert!(graph.remove_edge(5).is_none());
    }
}
