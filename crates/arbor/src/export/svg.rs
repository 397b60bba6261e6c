//! SVG backend.
//!
//! Every element is pushed into a [`LayeredOutput`], so z-order is decided by
//! layer and not by the order in which the renderer visits the graph:
//! background, cluster boxes (parents before children), edges, nodes, then
//! label backgrounds and text.

mod cluster;
mod edge;
mod node;

use std::{collections::BTreeMap, path::Path};

use log::{debug, info};
use svg::{
    Document,
    node::element::{Definitions, Marker, Path as SvgPath, Rectangle},
};

use arbor_core::{
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer, Text},
    geometry::Point,
};

use crate::{
    config::{AppConfig, StyleConfig},
    error::ArborError,
    layout::{Fonts, Layout},
    model::{ArrowHead, Graph},
    routing::Route,
};

/// Opacity of edge label backgrounds.
const LABEL_BACKGROUND_ALPHA: f32 = 0.85;

/// Theme colors resolved once from the [`StyleConfig`].
#[derive(Debug, Clone)]
struct Palette {
    background: Option<Color>,
    node_fill: Color,
    node_stroke: Color,
    cluster_fill: Color,
    cluster_stroke: Color,
    edge: Color,
}

impl Palette {
    fn new(style: &StyleConfig) -> Result<Self, ArborError> {
        Ok(Self {
            background: style.background_color()?,
            node_fill: style.node_fill()?,
            node_stroke: style.node_stroke()?,
            cluster_fill: style.cluster_fill()?,
            cluster_stroke: style.cluster_stroke()?,
            edge: style.edge_color()?,
        })
    }
}

/// Turns a laid out and routed graph into an SVG document.
#[derive(Debug, Clone)]
pub struct Renderer {
    palette: Palette,
    fonts: Fonts,
    cluster_padding: f32,
    icon_size: f32,
}

impl Renderer {
    /// # Errors
    ///
    /// [`ArborError::Configuration`] if a style color does not parse.
    pub fn new(config: &AppConfig) -> Result<Self, ArborError> {
        let style = config.style();
        let palette = Palette::new(style)?;
        let text_color = style.text_color()?;

        let mut fonts = Fonts::new(style);
        for definition in [
            &mut fonts.node_label,
            &mut fonts.cluster_title,
            &mut fonts.diagram_title,
            &mut fonts.edge_label,
        ] {
            definition.set_color(Some(text_color));
        }
        let label_background = palette
            .background
            .map_or_else(|| Color::new("white"), Ok)
            .map_err(|reason| ArborError::configuration("style.background_color", reason))?
            .with_alpha(LABEL_BACKGROUND_ALPHA);
        fonts.edge_label.set_background_color(Some(label_background));

        Ok(Self {
            palette,
            fonts,
            cluster_padding: config.layout().cluster_padding(),
            icon_size: config.layout().icon_size(),
        })
    }

    /// Renders the diagram to an SVG string.
    ///
    /// The output depends only on the arguments, so equal inputs give
    /// byte-identical documents.
    pub fn render_svg(&self, graph: &Graph, layout: &Layout, routes: &[Route]) -> String {
        let size = layout.size();
        info!(
            width = size.width(),
            height = size.height(),
            routes = routes.len();
            "Rendering SVG"
        );

        let mut output = self.render_background(graph, layout);

        for (cluster_id, cluster) in graph.clusters().filter(|(id, _)| !id.is_root()) {
            output.merge(self.render_cluster(cluster, layout.cluster(cluster_id)));
        }

        let mut marker_colors: BTreeMap<String, Color> = BTreeMap::new();
        for route in routes {
            let Some(edge) = graph.edges().get(route.edge()) else {
                continue;
            };
            let color = self.edge_color(edge);
            if edge.style().arrow() != ArrowHead::None {
                marker_colors.insert(color.to_id_safe_string(), color);
            }
            output.merge(self.render_edge(edge, route));
        }

        for (id, node_layout) in layout.nodes() {
            if let Some(node) = graph.node(id) {
                output.merge(self.render_node(node, node_layout));
            }
        }

        debug!(elements = output.len(), markers = marker_colors.len(); "SVG elements collected");

        let mut document = Document::new()
            .set("width", size.width())
            .set("height", size.height())
            .set("viewBox", format!("0 0 {} {}", size.width(), size.height()));

        if !marker_colors.is_empty() {
            document = document.add(marker_definitions(marker_colors.values()));
        }
        for node in output.render() {
            document = document.add(node);
        }

        document.to_string()
    }

    /// Renders the diagram and writes it atomically to `path`.
    ///
    /// # Errors
    ///
    /// [`ArborError::Render`] if the file cannot be written. An existing file
    /// at `path` is left untouched in that case.
    pub fn render_to_file(
        &self,
        graph: &Graph,
        layout: &Layout,
        routes: &[Route],
        path: &Path,
    ) -> Result<(), ArborError> {
        let contents = self.render_svg(graph, layout, routes);
        super::write_atomically(path, &contents)
    }

    fn render_background(&self, graph: &Graph, layout: &Layout) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let size = layout.size();

        if let Some(background) = self.palette.background {
            let rect = Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", size.width())
                .set("height", size.height())
                .set("fill", background.to_string())
                .set("fill-opacity", background.alpha());
            output.add_to_layer(RenderLayer::Background, Box::new(rect));
        }

        let title = Text::new(&self.fonts.diagram_title, graph.root().label());
        let title_size = title.calculate_size();
        if !title_size.is_zero() {
            let center = Point::new(
                size.width() / 2.0,
                self.cluster_padding + title_size.height() / 2.0,
            );
            output.merge(title.render_to_layers(center));
        }

        output
    }
}

/// Arrowhead markers, one pair per edge color.
fn marker_definitions<'a>(colors: impl Iterator<Item = &'a Color>) -> Definitions {
    let mut defs = Definitions::new();

    for color in colors {
        let id = color.to_id_safe_string();

        let arrow_right = Marker::new()
            .set("id", format!("arrow-right-{id}"))
            .set("viewBox", "0 0 10 10")
            .set("refX", 9)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto")
            .add(
                SvgPath::new()
                    .set("d", "M 0 0 L 10 5 L 0 10 z")
                    .set("fill", color.to_string()),
            );

        let arrow_left = Marker::new()
            .set("id", format!("arrow-left-{id}"))
            .set("viewBox", "0 0 10 10")
            .set("refX", 1)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto")
            .add(
                SvgPath::new()
                    .set("d", "M 10 0 L 0 5 L 10 10 z")
                    .set("fill", color.to_string()),
            );

        defs = defs.add(arrow_right).add(arrow_left);
    }

    defs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::{EdgeSpec, GraphBuilder},
        config::AppConfig,
        layout::LayoutEngine,
        model::{DiagramOptions, Direction, EdgeStyle},
        routing::EdgeRouter,
    };

    fn render(graph: &Graph) -> String {
        let config = AppConfig::default();
        let layout = LayoutEngine::new(&config).layout(graph);
        let routes = EdgeRouter::new(&config).route(graph, &layout);
        Renderer::new(&config)
            .unwrap()
            .render_svg(graph, &layout, &routes)
    }

    fn sample_graph() -> Graph {
        let options = DiagramOptions::new("Sample", Direction::TopDown, "out.svg");
        let mut builder = GraphBuilder::new(options).unwrap();
        builder.declare_node("a", "Alpha", None).unwrap();
        {
            let mut scope = builder.enter_cluster("vpc", "VPC").unwrap();
            scope.declare_node("b", "Beta", Some("aws/eks")).unwrap();
        }
        builder
            .declare_edge(EdgeSpec::new("a", "b").with_label("calls"))
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_render_contains_every_element() {
        let svg = render(&sample_graph());

        assert!(svg.contains("<svg"));
        assert!(svg.contains(r#"data-node-id="a""#));
        assert!(svg.contains(r#"data-node-id="b""#));
        assert!(svg.contains(r#"data-cluster-id="vpc""#));
        assert!(svg.contains(r#"data-source="a""#));
        assert!(svg.contains("calls"));
        assert!(svg.contains("Sample"));
        assert!(svg.contains("arrow-right-"));
    }

    #[test]
    fn test_render_layers_in_order() {
        let svg = render(&sample_graph());
        let position = |layer: &str| {
            svg.find(&format!(r#"data-layer="{layer}""#))
                .unwrap_or_else(|| panic!("missing layer {layer}"))
        };

        assert!(position("background") < position("cluster"));
        assert!(position("cluster") < position("edge"));
        assert!(position("edge") < position("node"));
        assert!(position("node") < position("text"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let graph = sample_graph();
        assert_eq!(render(&graph), render(&graph));
    }

    #[test]
    fn test_render_without_arrowheads_has_no_markers() {
        let options = DiagramOptions::new("", Direction::LeftRight, "out.svg");
        let mut builder = GraphBuilder::new(options).unwrap();
        builder.declare_node("a", "A", None).unwrap();
        builder.declare_node("b", "B", None).unwrap();
        builder
            .declare_edge(
                EdgeSpec::new("a", "b")
                    .with_style(EdgeStyle::new().with_arrow(ArrowHead::None)),
            )
            .unwrap();
        let svg = render(&builder.build().unwrap());

        assert!(!svg.contains("<marker"));
        assert!(!svg.contains("marker-end"));
    }
}
