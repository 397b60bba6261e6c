use svg::node::element::Path;

use arbor_core::{
    apply_stroke,
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer, StrokeDefinition, Text},
};

use super::Renderer;
use crate::{
    model::{ArrowHead, Edge, LineStyle},
    routing::Route,
};

const EDGE_WIDTH: f32 = 1.5;
const BOLD_EDGE_WIDTH: f32 = 3.0;

impl Renderer {
    pub(super) fn edge_color(&self, edge: &Edge) -> Color {
        edge.style().color().unwrap_or(self.palette.edge)
    }

    /// Edge path with its arrowheads, and the label on top of a backdrop.
    pub(super) fn render_edge(&self, edge: &Edge, route: &Route) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let color = self.edge_color(edge);

        let stroke = match edge.style().line() {
            LineStyle::Solid => StrokeDefinition::solid(color, EDGE_WIDTH),
            LineStyle::Dashed => StrokeDefinition::dashed(color, EDGE_WIDTH),
            LineStyle::Dotted => StrokeDefinition::dotted(color, EDGE_WIDTH),
            LineStyle::Bold => StrokeDefinition::solid(color, BOLD_EDGE_WIDTH),
        };

        let mut path = Path::new()
            .set("d", route.path_data())
            .set("fill", "none")
            .set("data-edge", route.edge())
            .set("data-source", edge.source())
            .set("data-target", edge.target());
        path = apply_stroke!(path, &stroke);

        let (marker_start, marker_end) = markers(edge.style().arrow(), color);
        if let Some(marker) = marker_start {
            path = path.set("marker-start", marker);
        }
        if let Some(marker) = marker_end {
            path = path.set("marker-end", marker);
        }
        if route.is_back_edge() {
            path = path.set("data-back-edge", "true");
        }
        if route.is_degraded() {
            path = path.set("data-degraded", "true");
        }
        output.add_to_layer(RenderLayer::Edge, Box::new(path));

        if let Some(label) = edge.label() {
            let text = Text::new(&self.fonts.edge_label, label);
            output.merge(text.render_to_layers(route.label_anchor()));
        }

        output
    }
}

/// Marker references for the start and end of an edge.
fn markers(arrow: ArrowHead, color: Color) -> (Option<String>, Option<String>) {
    let id = color.to_id_safe_string();
    let left = || Some(format!("url(#arrow-left-{id})"));
    let right = || Some(format!("url(#arrow-right-{id})"));

    match arrow {
        ArrowHead::Forward => (None, right()),
        ArrowHead::Backward => (left(), None),
        ArrowHead::Both => (left(), right()),
        ArrowHead::None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        let color = Color::new("red").unwrap();
        let id = color.to_id_safe_string();

        assert_eq!(
            markers(ArrowHead::Forward, color),
            (None, Some(format!("url(#arrow-right-{id})")))
        );
        assert_eq!(
            markers(ArrowHead::Backward, color),
            (Some(format!("url(#arrow-left-{id})")), None)
        );
        assert_eq!(markers(ArrowHead::None, color), (None, None));

        let (start, end) = markers(ArrowHead::Both, color);
        assert!(start.is_some() && end.is_some());
    }
}
