use svg::node::element::Rectangle;

use arbor_core::{
    apply_stroke,
    draw::{Drawable, LayeredOutput, RenderLayer, StrokeDefinition, StrokeStyle, Text},
    geometry::Point,
};

use super::Renderer;
use crate::{layout::ClusterLayout, model::Cluster};

impl Renderer {
    /// Cluster box with its title centered at the top.
    pub(super) fn render_cluster(
        &self,
        cluster: &Cluster,
        layout: &ClusterLayout,
    ) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let bounds = layout.bounds();

        // Nested clusters get a dashed outline.
        let style = if layout.depth() > 1 {
            StrokeStyle::Dashed
        } else {
            StrokeStyle::Solid
        };
        let stroke = StrokeDefinition::new(self.palette.cluster_stroke, 1.0, style);

        let rect = Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("rx", 6)
            .set("fill", self.palette.cluster_fill.to_string())
            .set("fill-opacity", self.palette.cluster_fill.alpha())
            .set("data-cluster-id", cluster.id());
        let rect = apply_stroke!(rect, &stroke);
        output.add_to_layer(RenderLayer::Cluster, Box::new(rect));

        let title = Text::new(&self.fonts.cluster_title, cluster.label());
        let title_size = title.calculate_size();
        if !title_size.is_zero() {
            let center = Point::new(
                bounds.center().x(),
                bounds.min_y() + self.cluster_padding + title_size.height() / 2.0,
            );
            output.merge(title.render_to_layers(center));
        }

        output
    }
}
