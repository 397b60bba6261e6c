//! The in-memory diagram graph.
//!
//! A [`Graph`] is produced once by [`GraphBuilder`](crate::GraphBuilder) and
//! is read-only for the rest of the pipeline. Clusters live in a flat vector
//! indexed by [`ClusterId`]; the implicit root cluster is always at index 0
//! and a child cluster always has a larger id than its parent.

use std::{fmt, path::PathBuf, str::FromStr};

use indexmap::IndexMap;

use arbor_core::{color::Color, geometry::Point, geometry::Size};

use crate::error::ArborError;

/// Index of a cluster inside its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(usize);

impl ClusterId {
    /// The implicit top-level cluster holding the whole diagram.
    pub const ROOT: ClusterId = ClusterId(0);

    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

/// Flow direction of the diagram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    TopDown,
    LeftRight,
}

impl FromStr for Direction {
    type Err = ArborError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top_down" | "TB" | "TD" => Ok(Self::TopDown),
            "left_right" | "LR" => Ok(Self::LeftRight),
            other => Err(ArborError::configuration(
                "direction",
                format!("expected `top_down` or `left_right`, found `{other}`"),
            )),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopDown => write!(f, "top_down"),
            Self::LeftRight => write!(f, "left_right"),
        }
    }
}

impl Direction {
    // Main axis follows the flow (ranks), cross axis orders items within a rank.

    /// Coordinate of `point` along the flow.
    pub fn main(self, point: Point) -> f32 {
        match self {
            Self::TopDown => point.y(),
            Self::LeftRight => point.x(),
        }
    }

    /// Coordinate of `point` across the flow.
    pub fn cross(self, point: Point) -> f32 {
        match self {
            Self::TopDown => point.x(),
            Self::LeftRight => point.y(),
        }
    }

    /// Builds a point from flow coordinates.
    pub fn point(self, main: f32, cross: f32) -> Point {
        match self {
            Self::TopDown => Point::new(cross, main),
            Self::LeftRight => Point::new(main, cross),
        }
    }

    pub fn main_extent(self, size: Size) -> f32 {
        match self {
            Self::TopDown => size.height(),
            Self::LeftRight => size.width(),
        }
    }

    pub fn cross_extent(self, size: Size) -> f32 {
        match self {
            Self::TopDown => size.width(),
            Self::LeftRight => size.height(),
        }
    }

    /// Builds a size from flow extents.
    pub fn size(self, main: f32, cross: f32) -> Size {
        match self {
            Self::TopDown => Size::new(cross, main),
            Self::LeftRight => Size::new(main, cross),
        }
    }
}

/// Which ends of an edge carry an arrowhead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrowHead {
    #[default]
    Forward,
    Backward,
    Both,
    None,
}

impl FromStr for ArrowHead {
    type Err = ArborError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Self::Forward),
            "backward" => Ok(Self::Backward),
            "both" => Ok(Self::Both),
            "none" => Ok(Self::None),
            other => Err(ArborError::configuration(
                "arrow",
                format!("expected forward, backward, both or none, found `{other}`"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Bold,
}

impl FromStr for LineStyle {
    type Err = ArborError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            "bold" => Ok(Self::Bold),
            other => Err(ArborError::configuration(
                "line",
                format!("expected solid, dashed, dotted or bold, found `{other}`"),
            )),
        }
    }
}

/// Visual attributes of an edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeStyle {
    arrow: ArrowHead,
    line: LineStyle,
    color: Option<Color>,
}

impl EdgeStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arrow(mut self, arrow: ArrowHead) -> Self {
        self.arrow = arrow;
        self
    }

    pub fn with_line(mut self, line: LineStyle) -> Self {
        self.line = line;
        self
    }

    /// Overrides the theme's edge color for this edge.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn arrow(&self) -> ArrowHead {
        self.arrow
    }

    pub fn line(&self) -> LineStyle {
        self.line
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }
}

/// Diagram-wide options supplied when building starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramOptions {
    title: String,
    direction: Direction,
    output_path: PathBuf,
}

impl DiagramOptions {
    pub fn new(
        title: impl Into<String>,
        direction: Direction,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            title: title.into(),
            direction,
            output_path: output_path.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn output_path(&self) -> &PathBuf {
        &self.output_path
    }

    /// Replaces the output path, e.g. from a command-line override.
    pub fn set_output_path(&mut self, output_path: impl Into<PathBuf>) {
        self.output_path = output_path.into();
    }
}

/// A direct member of a cluster, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Node(String),
    Cluster(ClusterId),
}

#[derive(Debug, Clone)]
pub struct Node {
    id: String,
    label: String,
    icon: Option<String>,
    cluster: ClusterId,
}

impl Node {
    pub(crate) fn new(id: String, label: String, icon: Option<String>, cluster: ClusterId) -> Self {
        Self {
            id,
            label,
            icon,
            cluster,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Label text; empty for a blank node.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Opaque icon tag such as `aws.compute.eks`.
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// The cluster that owns this node.
    pub fn cluster(&self) -> ClusterId {
        self.cluster
    }
}

#[derive(Debug, Clone)]
pub struct Cluster {
    id: String,
    label: String,
    parent: Option<ClusterId>,
    members: Vec<Member>,
    depth: usize,
}

impl Cluster {
    pub(crate) fn root(title: &str) -> Self {
        Self {
            id: String::new(),
            label: title.to_string(),
            parent: None,
            members: Vec::new(),
            depth: 0,
        }
    }

    pub(crate) fn new(id: String, label: String, parent: ClusterId, depth: usize) -> Self {
        Self {
            id,
            label,
            parent: Some(parent),
            members: Vec::new(),
            depth,
        }
    }

    pub(crate) fn push_member(&mut self, member: Member) {
        self.members.push(member);
    }

    /// Id of the cluster; empty for the root.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Parent cluster, `None` only for the root.
    pub fn parent(&self) -> Option<ClusterId> {
        self.parent
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Nesting depth, the root being 0.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    source: String,
    target: String,
    label: Option<String>,
    style: EdgeStyle,
    multiplicity: usize,
}

impl Edge {
    pub(crate) fn new(
        source: String,
        target: String,
        label: Option<String>,
        style: EdgeStyle,
        multiplicity: usize,
    ) -> Self {
        Self {
            source,
            target,
            label,
            style,
            multiplicity,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn style(&self) -> &EdgeStyle {
        &self.style
    }

    /// Index among earlier edges with the same source and target.
    pub fn multiplicity(&self) -> usize {
        self.multiplicity
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// A complete diagram: cluster tree, node index and edge list.
#[derive(Debug, Clone)]
pub struct Graph {
    options: DiagramOptions,
    clusters: Vec<Cluster>,
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
}

impl Graph {
    pub(crate) fn new(
        options: DiagramOptions,
        clusters: Vec<Cluster>,
        nodes: IndexMap<String, Node>,
        edges: Vec<Edge>,
    ) -> Self {
        Self {
            options,
            clusters,
            nodes,
            edges,
        }
    }

    pub fn options(&self) -> &DiagramOptions {
        &self.options
    }

    pub fn direction(&self) -> Direction {
        self.options.direction
    }

    pub fn root(&self) -> &Cluster {
        &self.clusters[ClusterId::ROOT.0]
    }

    /// Panics if `id` does not come from this graph.
    pub fn cluster(&self, id: ClusterId) -> &Cluster {
        &self.clusters[id.0]
    }

    /// All clusters with their ids, root first, parents before children.
    pub fn clusters(&self) -> impl Iterator<Item = (ClusterId, &Cluster)> {
        self.clusters
            .iter()
            .enumerate()
            .map(|(idx, cluster)| (ClusterId(idx), cluster))
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Looks up a non-root cluster by its declared id.
    pub fn find_cluster(&self, id: &str) -> Option<ClusterId> {
        self.clusters
            .iter()
            .position(|cluster| !id.is_empty() && cluster.id == id)
            .map(ClusterId)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Edges in declaration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Whether `ancestor` is `cluster` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: ClusterId, cluster: ClusterId) -> bool {
        let mut current = Some(cluster);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.clusters[id.0].parent;
        }
        false
    }

    /// The deepest cluster containing both `a` and `b`.
    pub fn lowest_common_ancestor(&self, a: ClusterId, b: ClusterId) -> ClusterId {
        let (mut a, mut b) = (a, b);
        while self.clusters[a.0].depth > self.clusters[b.0].depth {
            a = self.clusters[a.0].parent.unwrap_or(ClusterId::ROOT);
        }
        while self.clusters[b.0].depth > self.clusters[a.0].depth {
            b = self.clusters[b.0].parent.unwrap_or(ClusterId::ROOT);
        }
        while a != b {
            a = self.clusters[a.0].parent.unwrap_or(ClusterId::ROOT);
            b = self.clusters[b.0].parent.unwrap_or(ClusterId::ROOT);
        }
        a
    }

    /// Removes the edge at `index` and returns it.
    ///
    /// Nodes are never removed. Multiplicities of the remaining edges between
    /// the same ordered pair are renumbered to stay contiguous.
    pub fn remove_edge(&mut self, index: usize) -> Option<Edge> {
        if index >= self.edges.len() {
            return None;
        }
        let removed = self.edges.remove(index);

        let mut next = 0;
        for edge in self
            .edges
            .iter_mut()
            .filter(|edge| edge.source == removed.source && edge.target == removed.target)
        {
            edge.multiplicity = next;
            next += 1;
        }

        Some(removed)
    }
}
