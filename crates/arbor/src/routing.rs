//! Edge routing.
//!
//! Every edge gets anchors on the sides of its endpoint boxes that face each
//! other along the flow axis, then a path between them:
//!
//! - orthogonal and curved edges use a Z-shaped control polygon through a
//!   channel between the anchors, or a detour lane around blocking boxes;
//! - straight edges use the single segment between the anchors.
//!
//! Edges between the same two nodes, in either direction, are spread across
//! the flow and get staggered channels. Obstacles are cluster boxes that
//! contain neither endpoint; node boxes of other nodes are avoided when
//! possible. When nothing avoids the obstacles the configured
//! [`RoutingFallback`] applies and the route is marked degraded.

mod path;

use std::collections::HashMap;

use log::{debug, info, trace};

use arbor_core::geometry::{Bounds, EPSILON, Point};

use crate::{
    config::{AppConfig, EdgeShape, RoutingConfig, RoutingFallback},
    layout::Layout,
    model::{ClusterId, Direction, Edge, Graph},
};

/// Base distance between a self-loop and its node.
const SELF_LOOP_REACH: f32 = 20.0;
/// Minimum distance kept between an anchor and the node corner.
const ANCHOR_INSET: f32 = 4.0;

/// A routed edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    edge: usize,
    points: Vec<Point>,
    shape: EdgeShape,
    label_anchor: Point,
    degraded: bool,
    back_edge: bool,
}

impl Route {
    /// Index of the edge in [`Graph::edges`].
    pub fn edge(&self) -> usize {
        self.edge
    }

    /// Polyline vertices, or for a curved edge the Bézier control polygon.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn shape(&self) -> EdgeShape {
        self.shape
    }

    /// Where the edge label is centered.
    pub fn label_anchor(&self) -> Point {
        self.label_anchor
    }

    /// Set when no candidate path avoided the obstacles.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn is_back_edge(&self) -> bool {
        self.back_edge
    }

    pub fn start(&self) -> Point {
        self.points.first().copied().unwrap_or_default()
    }

    pub fn end(&self) -> Point {
        self.points.last().copied().unwrap_or_default()
    }

    /// SVG path data for this route.
    pub fn path_data(&self) -> String {
        let Some((first, rest)) = self.points.split_first() else {
            return String::new();
        };

        let mut data = format!("M {} {}", first.x(), first.y());
        match (self.shape, rest) {
            (EdgeShape::Curved, [c1, c2, end]) => {
                data.push_str(&format!(
                    " C {} {}, {} {}, {} {}",
                    c1.x(),
                    c1.y(),
                    c2.x(),
                    c2.y(),
                    end.x(),
                    end.y()
                ));
            }
            (EdgeShape::Curved, _) if rest.len() > 1 => {
                // Longer polygons get rounded corners.
                let mut previous = *first;
                for (corner, next) in self.points[1..].iter().zip(&self.points[2..]) {
                    let enter = previous.midpoint(*corner);
                    let leave = corner.midpoint(*next);
                    data.push_str(&format!(
                        " L {} {} Q {} {}, {} {}",
                        enter.x(),
                        enter.y(),
                        corner.x(),
                        corner.y(),
                        leave.x(),
                        leave.y()
                    ));
                    previous = *corner;
                }
                let end = self.end();
                data.push_str(&format!(" L {} {}", end.x(), end.y()));
            }
            _ => {
                for point in rest {
                    data.push_str(&format!(" L {} {}", point.x(), point.y()));
                }
            }
        }
        data
    }
}

/// Obstacles seen by one edge.
struct Obstacles {
    clusters: Vec<Bounds>,
    nodes: Vec<Bounds>,
}

impl Obstacles {
    fn blocks(&self, points: &[Point]) -> bool {
        self.clusters.iter().any(|bounds| path::crosses(points, bounds))
    }

    fn blocks_softly(&self, points: &[Point]) -> bool {
        self.nodes.iter().any(|bounds| path::crosses(points, bounds))
    }
}

/// Computes a [`Route`] for every edge of a laid out graph.
#[derive(Debug, Clone)]
pub struct EdgeRouter {
    config: RoutingConfig,
}

impl EdgeRouter {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.routing().clone(),
        }
    }

    /// Routes every edge, in declaration order.
    pub fn route(&self, graph: &Graph, layout: &Layout) -> Vec<Route> {
        info!(
            edges = graph.edges().len(),
            shape:? = self.config.edge_shape();
            "Routing edges"
        );

        let slots = parallel_slots(graph.edges());
        let mut routes = Vec::with_capacity(graph.edges().len());

        for (index, edge) in graph.edges().iter().enumerate() {
            let (Some(source), Some(target)) =
                (layout.node(edge.source()), layout.node(edge.target()))
            else {
                continue;
            };
            let (slot, count) = slots[index];

            let route = if edge.is_self_loop() {
                self.self_loop(index, source.bounds(), slot, layout.direction())
            } else {
                let obstacles = obstacles(graph, layout, edge);
                self.route_between(
                    index,
                    source.bounds(),
                    target.bounds(),
                    (slot, count),
                    layout.runs_against_flow(index),
                    layout.direction(),
                    &obstacles,
                )
            };

            if route.degraded {
                debug!(
                    edge = index,
                    source = edge.source(),
                    target = edge.target();
                    "No obstacle-free route, fallback applied"
                );
            }
            trace!(edge = index, points = route.points.len(); "Edge routed");
            routes.push(Route {
                back_edge: layout.is_back_edge(index),
                ..route
            });
        }

        info!(
            routes = routes.len(),
            degraded = routes.iter().filter(|route| route.degraded).count();
            "Edges routed"
        );
        routes
    }

    #[allow(clippy::too_many_arguments)]
    fn route_between(
        &self,
        index: usize,
        source: Bounds,
        target: Bounds,
        (slot, count): (usize, usize),
        reversed: bool,
        direction: Direction,
        obstacles: &Obstacles,
    ) -> Route {
        let half = cross_half(source, direction).min(cross_half(target, direction));
        let limit = (half - ANCHOR_INSET).max(0.0);
        let offset = lateral_offset(slot, count, self.config.parallel_spacing(), limit);

        // Forward edges leave the far side of the source, reversed ones the near side.
        let (source_main, target_main) = if reversed {
            (main_min(source, direction), main_max(target, direction))
        } else {
            (main_max(source, direction), main_min(target, direction))
        };
        let cs = direction.cross(source.center()) + offset;
        let ct = direction.cross(target.center()) + offset;
        let start = direction.point(source_main, cs);
        let end = direction.point(target_main, ct);

        let shape = self.config.edge_shape();
        if shape == EdgeShape::Straight {
            let points = vec![start, end];
            let degraded = obstacles.blocks(&points);
            return self.finish(index, points, shape, degraded);
        }

        let candidates = self.candidates(start, end, offset, direction, obstacles);
        let chosen = candidates
            .iter()
            .find(|points| !obstacles.blocks(points) && !obstacles.blocks_softly(points))
            .or_else(|| candidates.iter().find(|points| !obstacles.blocks(points)));

        match chosen {
            Some(points) => self.finish(index, points.clone(), shape, false),
            None => match self.config.fallback() {
                RoutingFallback::Straight => {
                    self.finish(index, vec![start, end], EdgeShape::Straight, true)
                }
                RoutingFallback::Overlap => self.finish(index, candidates[0].clone(), shape, true),
            },
        }
    }

    /// Candidate control polygons, best first. Never empty.
    fn candidates(
        &self,
        start: Point,
        end: Point,
        offset: f32,
        direction: Direction,
        obstacles: &Obstacles,
    ) -> Vec<Vec<Point>> {
        let (sm, tm) = (direction.main(start), direction.main(end));
        let (cs, ct) = (direction.cross(start), direction.cross(end));
        let dm = if tm >= sm { 1.0 } else { -1.0 };
        let gap = (tm - sm).abs();

        // Parallel edges turn at different depths so their lateral legs never meet.
        let stagger = if (ct - cs).abs() <= EPSILON {
            0.0
        } else {
            offset * (ct - cs).signum()
        };

        let margin = self.config.clearance().min(gap / 2.0);
        let clamp = |channel: f32| {
            let (lo, hi) = (sm.min(tm) + margin, sm.max(tm) - margin);
            if lo > hi { (sm + tm) / 2.0 } else { channel.clamp(lo, hi) }
        };

        let direct = clamp((sm + tm) / 2.0 - dm * stagger);
        let near_source = clamp(sm + dm * margin.max(gap * 0.2) - dm * stagger * 0.5);
        let near_target = clamp(tm - dm * margin.max(gap * 0.2) - dm * stagger * 0.5);

        let z = |channel: f32| {
            path::collapse(vec![
                start,
                direction.point(channel, cs),
                direction.point(channel, ct),
                end,
            ])
        };

        let mut candidates = vec![z(direct), z(near_source), z(near_target)];

        // Detours turn before the boxes lying between the anchors, run along a
        // lane beyond their cross extent, and turn back after them.
        let (lo, hi) = (sm.min(tm), sm.max(tm));
        let between = |bounds: &&Bounds| {
            main_max(**bounds, direction) > lo && main_min(**bounds, direction) < hi
        };
        let all: Vec<Bounds> = obstacles
            .clusters
            .iter()
            .chain(&obstacles.nodes)
            .filter(between)
            .copied()
            .collect();
        let hard: Vec<Bounds> = obstacles.clusters.iter().filter(between).copied().collect();

        let clearance = self.config.clearance().max(EPSILON);
        let center = (cs + ct) / 2.0;
        for blocking in [all, hard] {
            let Some(extent) = blocking.iter().copied().reduce(|a, b| a.merge(&b)) else {
                continue;
            };

            let (first, last) = if dm > 0.0 {
                (main_min(extent, direction), main_max(extent, direction))
            } else {
                (main_max(extent, direction), main_min(extent, direction))
            };
            let turn_out = clamp((sm + first) / 2.0 - dm * stagger * 0.5);
            let turn_back = clamp((last + tm) / 2.0 - dm * stagger * 0.5);

            let low = cross_min(extent, direction) - clearance + offset;
            let high = cross_max(extent, direction) + clearance + offset;
            let mut lanes = [low, high];
            if (high - center).abs() < (low - center).abs() {
                lanes.swap(0, 1);
            }

            for lane in lanes {
                candidates.push(path::collapse(vec![
                    start,
                    direction.point(turn_out, cs),
                    direction.point(turn_out, lane),
                    direction.point(turn_back, lane),
                    direction.point(turn_back, ct),
                    end,
                ]));
            }
        }

        candidates
    }

    /// A rectangular loop on the cross-max side of the node.
    fn self_loop(&self, index: usize, bounds: Bounds, slot: usize, direction: Direction) -> Route {
        let reach = SELF_LOOP_REACH + slot as f32 * self.config.parallel_spacing();
        let side = cross_max(bounds, direction);
        let center = direction.main(bounds.center());
        let quarter = (main_max(bounds, direction) - main_min(bounds, direction)) / 4.0;

        let points = vec![
            direction.point(center - quarter, side),
            direction.point(center - quarter, side + reach),
            direction.point(center + quarter, side + reach),
            direction.point(center + quarter, side),
        ];

        let shape = match self.config.edge_shape() {
            EdgeShape::Straight => EdgeShape::Orthogonal,
            shape => shape,
        };
        self.finish(index, points, shape, false)
    }

    fn finish(&self, edge: usize, points: Vec<Point>, shape: EdgeShape, degraded: bool) -> Route {
        let label_anchor = match (shape, points.as_slice()) {
            (EdgeShape::Curved, &[start, c1, c2, end]) => path::bezier_midpoint(start, c1, c2, end),
            _ => path::arc_midpoint(&points),
        };

        Route {
            edge,
            points,
            shape,
            label_anchor,
            degraded,
            back_edge: false,
        }
    }
}

/// Cross-axis offset of slot `slot` among `count` parallel edges.
///
/// Offsets are `spacing` apart and centered on zero. A group too wide for
/// `±limit` is squeezed evenly so every slot keeps its own offset.
fn lateral_offset(slot: usize, count: usize, spacing: f32, limit: f32) -> f32 {
    if count < 2 {
        return 0.0;
    }
    let span = (count - 1) as f32;
    let spacing = spacing.min(2.0 * limit / span);
    spacing * (slot as f32 - span / 2.0)
}

/// Slot and group size of every edge among edges joining the same two nodes.
fn parallel_slots(edges: &[Edge]) -> Vec<(usize, usize)> {
    let key = |edge: &Edge| {
        if edge.source() <= edge.target() {
            (edge.source().to_string(), edge.target().to_string())
        } else {
            (edge.target().to_string(), edge.source().to_string())
        }
    };

    let mut counts: HashMap<(String, String), usize> = HashMap::new();
    let slots: Vec<usize> = edges
        .iter()
        .map(|edge| {
            let count = counts.entry(key(edge)).or_default();
            *count += 1;
            *count - 1
        })
        .collect();

    edges
        .iter()
        .zip(slots)
        .map(|(edge, slot)| (slot, counts.get(&key(edge)).copied().unwrap_or(1)))
        .collect()
}

fn obstacles(graph: &Graph, layout: &Layout, edge: &Edge) -> Obstacles {
    let endpoint_clusters: Vec<ClusterId> = [edge.source(), edge.target()]
        .iter()
        .filter_map(|id| graph.node(id).map(|node| node.cluster()))
        .collect();

    let clusters = graph
        .clusters()
        .filter(|(id, _)| !id.is_root())
        .filter(|(id, _)| {
            !endpoint_clusters
                .iter()
                .any(|&cluster| graph.is_ancestor(*id, cluster))
        })
        .map(|(id, _)| layout.cluster(id).bounds())
        .collect();

    let nodes = layout
        .nodes()
        .filter(|(id, _)| *id != edge.source() && *id != edge.target())
        .map(|(_, node)| node.bounds())
        .collect();

    Obstacles { clusters, nodes }
}

fn main_min(bounds: Bounds, direction: Direction) -> f32 {
    direction.main(Point::new(bounds.min_x(), bounds.min_y()))
}

fn main_max(bounds: Bounds, direction: Direction) -> f32 {
    direction.main(Point::new(bounds.max_x(), bounds.max_y()))
}

fn cross_min(bounds: Bounds, direction: Direction) -> f32 {
    direction.cross(Point::new(bounds.min_x(), bounds.min_y()))
}

fn cross_max(bounds: Bounds, direction: Direction) -> f32 {
    direction.cross(Point::new(bounds.max_x(), bounds.max_y()))
}

fn cross_half(bounds: Bounds, direction: Direction) -> f32 {
    (cross_max(bounds, direction) - cross_min(bounds, direction)) / 2.0
}
