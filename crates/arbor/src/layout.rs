//! Hierarchical layered layout.
//!
//! Every cluster is a *scope* whose *items* are its direct members: nodes,
//! and child clusters treated as opaque boxes. Scopes are processed
//! innermost first, so a child cluster's size is known before its parent is
//! laid out:
//!
//! 1. each edge is assigned to the lowest common ancestor of its endpoints
//!    and lifted to the two items of that scope containing them;
//! 2. [`ranking`] assigns longest-path ranks. Back edges are found once on
//!    the node graph and never reach a scope; an edge whose lifted items
//!    already reach each other the other way round is folded instead;
//! 3. [`ordering`] reduces crossings with barycenter sweeps;
//! 4. [`placement`] turns ranks and orders into relative coordinates, and the
//!    cluster box adds padding and a title band around the content.
//!
//! Finally scopes are translated top-down into absolute coordinates.

mod ordering;
mod placement;
mod ranking;

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info, trace, warn};

use arbor_core::{
    draw::{Text, TextDefinition},
    geometry::{Bounds, Insets, Point, Size},
};

use crate::{
    config::{AppConfig, LayoutConfig, StyleConfig},
    error::CycleWarning,
    model::{ClusterId, Direction, Graph, Member, Node},
};

use ranking::ScopeEdge;

/// Inner padding of a node box.
pub(crate) const NODE_PADDING: f32 = 10.0;
/// Gap between the icon badge and the label inside a node.
pub(crate) const ICON_GAP: f32 = 6.0;
/// Gap between a cluster title and the cluster content.
pub(crate) const TITLE_GAP: f32 = 6.0;
/// Free space kept around an edge label between two ranks.
const LABEL_MARGIN: f32 = 12.0;

/// Text styles used for measuring, shared with the renderer.
#[derive(Debug, Clone)]
pub(crate) struct Fonts {
    pub node_label: TextDefinition,
    pub cluster_title: TextDefinition,
    pub diagram_title: TextDefinition,
    pub edge_label: TextDefinition,
}

impl Fonts {
    pub(crate) fn new(style: &StyleConfig) -> Self {
        let mut node_label = TextDefinition::new();
        node_label.set_font_family(style.font_family());
        node_label.set_font_size(style.font_size());

        let mut cluster_title = node_label.clone();
        cluster_title.set_font_size(style.font_size().saturating_add(1));

        let mut diagram_title = node_label.clone();
        diagram_title.set_font_size(style.title_font_size());

        let mut edge_label = node_label.clone();
        edge_label.set_font_size(style.font_size().saturating_sub(2).max(1));
        edge_label.set_padding(Insets::uniform(3.0));

        Self {
            node_label,
            cluster_title,
            diagram_title,
            edge_label,
        }
    }

    /// Title style of a cluster; the root uses the diagram title style.
    pub(crate) fn title_for(&self, cluster: ClusterId) -> &TextDefinition {
        if cluster.is_root() {
            &self.diagram_title
        } else {
            &self.cluster_title
        }
    }
}

/// Placement of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeLayout {
    bounds: Bounds,
    rank: usize,
    order: usize,
}

impl NodeLayout {
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Rank inside the node's own cluster.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Position inside the rank.
    pub fn order(&self) -> usize {
        self.order
    }
}

/// Placement of one cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterLayout {
    bounds: Bounds,
    depth: usize,
    rank: usize,
    order: usize,
}

impl ClusterLayout {
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Rank inside the parent cluster; 0 for the root.
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn order(&self) -> usize {
        self.order
    }
}

/// The result of laying out a [`Graph`].
#[derive(Debug, Clone)]
pub struct Layout {
    direction: Direction,
    nodes: IndexMap<String, NodeLayout>,
    clusters: Vec<ClusterLayout>,
    back_edges: Vec<bool>,
    folded_edges: Vec<bool>,
    warnings: Vec<CycleWarning>,
    crossings: usize,
    size: Size,
}

impl Layout {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.get(id)
    }

    /// Node layouts in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeLayout)> {
        self.nodes.iter().map(|(id, layout)| (id.as_str(), layout))
    }

    /// Panics if `id` does not belong to the laid out graph.
    pub fn cluster(&self, id: ClusterId) -> &ClusterLayout {
        &self.clusters[id.index()]
    }

    pub fn clusters(&self) -> &[ClusterLayout] {
        &self.clusters
    }

    /// Whether the edge at `index` closes a cycle of the node graph.
    pub fn is_back_edge(&self, index: usize) -> bool {
        self.back_edges.get(index).copied().unwrap_or(false)
    }

    /// Whether the edge at `index` is acyclic but runs against the flow,
    /// because the clusters holding its endpoints are ordered the other way.
    pub fn is_folded_edge(&self, index: usize) -> bool {
        self.folded_edges.get(index).copied().unwrap_or(false)
    }

    /// Whether the edge at `index` is drawn from a later rank to an earlier one.
    pub fn runs_against_flow(&self, index: usize) -> bool {
        self.is_back_edge(index) || self.is_folded_edge(index)
    }

    pub fn warnings(&self) -> &[CycleWarning] {
        &self.warnings
    }

    /// Crossings between adjacent ranks, summed over all scopes.
    pub fn crossings(&self) -> usize {
        self.crossings
    }

    /// Size of the whole diagram.
    pub fn size(&self) -> Size {
        self.size
    }
}

/// Per-scope result kept until absolute placement.
#[derive(Debug, Default)]
struct ScopeLayout {
    ranks: Vec<usize>,
    orders: Vec<usize>,
    item_sizes: Vec<Size>,
    offsets: Vec<Point>,
    /// Offset of the content inside the cluster box.
    content_origin: Point,
    size: Size,
}

/// Computes node and cluster geometry from a [`Graph`].
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    fonts: Fonts,
}

impl LayoutEngine {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.layout().clone(),
            fonts: Fonts::new(config.style()),
        }
    }

    /// Lays out `graph`. Identical graphs always produce identical layouts.
    pub fn layout(&self, graph: &Graph) -> Layout {
        let direction = graph.direction();
        info!(
            nodes = graph.node_count(),
            clusters = graph.cluster_count(),
            edges = graph.edges().len(),
            direction:%;
            "Computing layout"
        );

        let back_edges = ranking::find_back_edges(graph);
        let slots = ItemSlots::new(graph);
        let scope_edges = assign_edges(graph, &slots, &back_edges);

        let mut scopes: Vec<ScopeLayout> = (0..graph.cluster_count())
            .map(|_| ScopeLayout::default())
            .collect();
        let mut folded_edges = vec![false; graph.edges().len()];
        let mut crossings = 0;

        // Children always have larger ids than their parents.
        for (cluster_id, cluster) in graph.clusters().collect::<Vec<_>>().into_iter().rev() {
            let sizes: Vec<Size> = cluster
                .members()
                .iter()
                .map(|member| match member {
                    Member::Node(id) => graph
                        .node(id)
                        .map(|node| self.node_size(node))
                        .unwrap_or_default(),
                    Member::Cluster(child) => scopes[child.index()].size,
                })
                .collect();

            let edges = &scope_edges[cluster_id.index()];
            let ranking = ranking::rank_items(sizes.len(), edges);
            for &edge in &ranking.folded {
                trace!(edge, cluster = cluster.id(); "Edge folded against the flow");
                folded_edges[edge] = true;
            }

            let (layers, scope_crossings) = ordering::order_layers(
                &ranking.ranks,
                &ranking.dag_edges,
                self.config.ordering_passes(),
            );
            crossings += scope_crossings;

            let mut orders = vec![0; sizes.len()];
            for layer in &layers {
                for (order, &item) in layer.iter().enumerate() {
                    orders[item] = order;
                }
            }

            let rank_gaps = self.rank_gaps(graph, edges, &ranking.ranks, layers.len(), direction);
            let placement = placement::place(
                &layers,
                &sizes,
                &rank_gaps,
                self.config.node_spacing(),
                direction,
            );

            let (size, content_origin) = self.cluster_box(graph, cluster_id, placement.content);
            debug!(
                cluster = cluster.id(),
                items = sizes.len(),
                ranks = layers.len(),
                crossings = scope_crossings,
                width = size.width(),
                height = size.height();
                "Scope laid out"
            );

            scopes[cluster_id.index()] = ScopeLayout {
                ranks: ranking.ranks,
                orders,
                item_sizes: sizes,
                offsets: placement.offsets,
                content_origin,
                size,
            };
        }

        let warnings: Vec<CycleWarning> = graph
            .edges()
            .iter()
            .enumerate()
            .filter(|(index, _)| back_edges[*index])
            .map(|(edge_index, edge)| CycleWarning {
                source: edge.source().to_string(),
                target: edge.target().to_string(),
                edge_index,
            })
            .collect();
        for warning in &warnings {
            warn!(
                source = warning.source,
                target = warning.target,
                edge = warning.edge_index;
                "Edge closes a cycle, drawn as a back edge"
            );
        }

        let (nodes, clusters) = absolute_positions(graph, &scopes);
        let size = scopes[ClusterId::ROOT.index()].size;
        info!(
            width = size.width(),
            height = size.height(),
            crossings,
            back_edges = warnings.len();
            "Layout calculated"
        );

        Layout {
            direction,
            nodes,
            clusters,
            back_edges,
            folded_edges,
            warnings,
            crossings,
            size,
        }
    }

    /// Size of a node box: icon badge above the label, both padded.
    pub(crate) fn node_size(&self, node: &Node) -> Size {
        let label = Text::new(&self.fonts.node_label, node.label()).calculate_size();
        let icon_size = self.config.icon_size();

        let (icon_width, icon_height) = if node.icon().is_some() {
            let gap = if label.is_zero() { 0.0 } else { ICON_GAP };
            (icon_size, icon_size + gap)
        } else {
            (0.0, 0.0)
        };

        Size::new(
            label.width().max(icon_width) + 2.0 * NODE_PADDING,
            label.height() + icon_height + 2.0 * NODE_PADDING,
        )
        .max(Size::new(
            self.config.node_min_width(),
            self.config.node_min_height(),
        ))
    }

    /// Gaps between consecutive ranks, widened for edge labels.
    fn rank_gaps(
        &self,
        graph: &Graph,
        edges: &[ScopeEdge],
        ranks: &[usize],
        rank_count: usize,
        direction: Direction,
    ) -> Vec<f32> {
        let mut gaps = vec![self.config.rank_spacing(); rank_count.saturating_sub(1)];

        for scope_edge in edges {
            let Some(label) = graph.edges()[scope_edge.edge].label() else {
                continue;
            };
            let (a, b) = (ranks[scope_edge.source], ranks[scope_edge.target]);
            if a == b {
                continue;
            }

            let label_size = Text::new(&self.fonts.edge_label, label).calculate_size();
            let needed = direction.main_extent(label_size) + 2.0 * LABEL_MARGIN;
            let gap = &mut gaps[a.min(b)];
            *gap = gap.max(needed);
        }

        gaps
    }

    /// Box size of a cluster around `content`, and where the content starts.
    fn cluster_box(&self, graph: &Graph, cluster_id: ClusterId, content: Size) -> (Size, Point) {
        let padding = self.config.cluster_padding();
        let label = graph.cluster(cluster_id).label();
        let title = Text::new(self.fonts.title_for(cluster_id), label).calculate_size();
        let band = if title.is_zero() {
            0.0
        } else {
            title.height() + TITLE_GAP
        };

        let width = content.width().max(title.width()) + 2.0 * padding;
        let height = content.height() + band + 2.0 * padding;
        let origin = Point::new((width - content.width()) / 2.0, padding + band);

        (Size::new(width, height), origin)
    }
}

/// Index of every node and cluster among its parent's members.
struct ItemSlots<'g> {
    nodes: HashMap<&'g str, usize>,
    clusters: Vec<usize>,
}

impl<'g> ItemSlots<'g> {
    fn new(graph: &'g Graph) -> Self {
        let mut nodes = HashMap::with_capacity(graph.node_count());
        let mut clusters = vec![0; graph.cluster_count()];

        for (_, cluster) in graph.clusters() {
            for (slot, member) in cluster.members().iter().enumerate() {
                match member {
                    Member::Node(id) => {
                        nodes.insert(id.as_str(), slot);
                    }
                    Member::Cluster(child) => clusters[child.index()] = slot,
                }
            }
        }

        Self { nodes, clusters }
    }

    /// The item of `scope` that contains the node `id`.
    fn lift(&self, graph: &Graph, id: &str, scope: ClusterId) -> usize {
        let Some(node) = graph.node(id) else {
            return 0;
        };

        let mut cluster = node.cluster();
        if cluster == scope {
            return self.nodes.get(id).copied().unwrap_or_default();
        }
        while let Some(parent) = graph.cluster(cluster).parent() {
            if parent == scope {
                break;
            }
            cluster = parent;
        }
        self.clusters[cluster.index()]
    }
}

/// Buckets every edge that is not a back edge into the scope of its
/// endpoints' lowest common ancestor.
fn assign_edges(
    graph: &Graph,
    slots: &ItemSlots<'_>,
    back_edges: &[bool],
) -> Vec<Vec<ScopeEdge>> {
    let mut scope_edges = vec![Vec::new(); graph.cluster_count()];

    for (index, edge) in graph.edges().iter().enumerate() {
        if back_edges[index] {
            continue;
        }
        let (Some(source), Some(target)) =
            (graph.node(edge.source()), graph.node(edge.target()))
        else {
            continue;
        };

        let scope = graph.lowest_common_ancestor(source.cluster(), target.cluster());
        let scope_edge = ScopeEdge {
            edge: index,
            source: slots.lift(graph, edge.source(), scope),
            target: slots.lift(graph, edge.target(), scope),
        };
        trace!(
            edge = index,
            scope = scope.index(),
            source = scope_edge.source,
            target = scope_edge.target;
            "Edge lifted"
        );
        scope_edges[scope.index()].push(scope_edge);
    }

    scope_edges
}

/// Translates relative scope placements into absolute bounds, top-down.
fn absolute_positions(
    graph: &Graph,
    scopes: &[ScopeLayout],
) -> (IndexMap<String, NodeLayout>, Vec<ClusterLayout>) {
    let mut clusters: Vec<ClusterLayout> = graph
        .clusters()
        .map(|(_, cluster)| ClusterLayout {
            bounds: Bounds::default(),
            depth: cluster.depth(),
            rank: 0,
            order: 0,
        })
        .collect();
    let mut node_layouts: HashMap<&str, NodeLayout> = HashMap::with_capacity(graph.node_count());

    let root = &scopes[ClusterId::ROOT.index()];
    clusters[ClusterId::ROOT.index()].bounds =
        Bounds::new_from_top_left(Point::default(), root.size);

    for (cluster_id, cluster) in graph.clusters() {
        let scope = &scopes[cluster_id.index()];
        let origin = clusters[cluster_id.index()]
            .bounds
            .min_point()
            .add_point(scope.content_origin);

        for (item, member) in cluster.members().iter().enumerate() {
            let top_left = origin.add_point(scope.offsets[item]);
            let (rank, order) = (scope.ranks[item], scope.orders[item]);

            match member {
                Member::Node(id) => {
                    node_layouts.insert(
                        id.as_str(),
                        NodeLayout {
                            bounds: Bounds::new_from_top_left(top_left, scope.item_sizes[item]),
                            rank,
                            order,
                        },
                    );
                }
                Member::Cluster(child) => {
                    let layout = &mut clusters[child.index()];
                    let size = scopes[child.index()].size;
                    layout.bounds = Bounds::new_from_top_left(top_left, size);
                    layout.rank = rank;
                    layout.order = order;
                }
            }
        }
    }

    let nodes = graph
        .nodes()
        .filter_map(|node| {
            node_layouts
                .get(node.id())
                .map(|layout| (node.id().to_string(), *layout))
        })
        .collect();

    (nodes, clusters)
}
