use svg::node::element::Rectangle;

use arbor_core::{
    apply_stroke,
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer, StrokeDefinition, Text, TextDefinition},
    geometry::Point,
};

use super::Renderer;
use crate::{
    layout::{ICON_GAP, NodeLayout},
    model::Node,
};

/// Share of the badge height taken by its abbreviation.
const BADGE_TEXT_RATIO: f32 = 0.3;

impl Renderer {
    /// Node box, optional icon badge and label, centered as one block.
    pub(super) fn render_node(&self, node: &Node, layout: &NodeLayout) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let bounds = layout.bounds();

        let rect = Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("rx", 4)
            .set("fill", self.palette.node_fill.to_string())
            .set("fill-opacity", self.palette.node_fill.alpha())
            .set("data-node-id", node.id());
        let rect = apply_stroke!(rect, &StrokeDefinition::solid(self.palette.node_stroke, 1.5));
        output.add_to_layer(RenderLayer::Node, Box::new(rect));

        let label = Text::new(&self.fonts.node_label, node.label());
        let label_size = label.calculate_size();

        let icon_block = match node.icon() {
            Some(_) if label_size.is_zero() => self.icon_size,
            Some(_) => self.icon_size + ICON_GAP,
            None => 0.0,
        };
        let top = bounds.center().y() - (icon_block + label_size.height()) / 2.0;

        if let Some(icon) = node.icon() {
            let center = Point::new(bounds.center().x(), top + self.icon_size / 2.0);
            output.merge(self.render_badge(icon, center));
        }

        if !label_size.is_zero() {
            let center = Point::new(
                bounds.center().x(),
                top + icon_block + label_size.height() / 2.0,
            );
            output.merge(label.render_to_layers(center));
        }

        output
    }

    /// Square badge standing in for an icon: a color derived from the tag
    /// and a short abbreviation of it.
    fn render_badge(&self, icon: &str, center: Point) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let size = self.icon_size;
        let color = Color::for_tag(icon);

        let badge = Rectangle::new()
            .set("x", center.x() - size / 2.0)
            .set("y", center.y() - size / 2.0)
            .set("width", size)
            .set("height", size)
            .set("rx", 6)
            .set("fill", color.to_string())
            .set("data-icon", icon);
        output.add_to_layer(RenderLayer::Node, Box::new(badge));

        let mut definition = TextDefinition::new();
        definition.set_font_family(self.fonts.node_label.font_family());
        definition.set_font_size(((size * BADGE_TEXT_RATIO).round() as u16).max(6));
        definition.set_color(Color::new("white").ok());

        let abbreviation = abbreviate(icon);
        output.merge(Text::new(&definition, &abbreviation).render_to_layers(center));

        output
    }
}

/// Short uppercase tag for an icon name such as `aws/api-gateway`.
///
/// Multi-word names give their initials, short names are kept whole and
/// longer ones are cut to three letters.
fn abbreviate(icon: &str) -> String {
    let name = icon
        .rsplit(['/', ':', '.'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(icon);

    let words: Vec<&str> = name
        .split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .collect();

    match words.as_slice() {
        [] => String::new(),
        [word] if word.chars().count() <= 4 => word.to_uppercase(),
        [word] => word.chars().take(3).collect::<String>().to_uppercase(),
        words => words
            .iter()
            .filter_map(|word| word.chars().next())
            .take(3)
            .collect::<String>()
            .to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("aws/eks"), "EKS");
        assert_eq!(abbreviate("aws/lambda"), "LAM");
        assert_eq!(abbreviate("aws/api-gateway"), "AG");
        assert_eq!(abbreviate("k8s:pod"), "POD");
        assert_eq!(abbreviate("db"), "DB");
        assert_eq!(abbreviate("load_balancer_v2"), "LBV");
        assert_eq!(abbreviate(""), "");
    }

    #[test]
    fn test_abbreviate_ignores_trailing_separator() {
        assert_eq!(abbreviate("gcp/storage/"), "STO");
    }
}
