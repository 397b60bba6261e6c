//! Layer-based rendering system for SVG output.
//!
//! Drawables push SVG nodes into a [`LayeredOutput`] tagged with a
//! [`RenderLayer`]; rendering emits one `<g data-layer="...">` per non-empty
//! layer, bottom to top.
//!
//! # Example
//!
//! ```
//! # use arbor_core::draw::{RenderLayer, LayeredOutput};
//! # use svg::node::element::Rectangle;
//! let mut output = LayeredOutput::new();
//! output.add_to_layer(RenderLayer::Node, Box::new(Rectangle::new()));
//! output.add_to_layer(RenderLayer::Background, Box::new(Rectangle::new()));
//!
//! let svg_nodes = output.render();
//! assert_eq!(svg_nodes.len(), 2);
//! ```

use log::trace;
use svg::node::element as svg_element;

/// Type alias for boxed SVG nodes.
pub type SvgNode = Box<dyn svg::Node>;

/// Defines the rendering layers for SVG output.
///
/// Layers are rendered from bottom to top in the order defined by variant declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Diagram background and title
    Background,
    /// Cluster boxes, outermost first
    Cluster,
    /// Routed edge paths
    Edge,
    /// Node shapes and icon badges
    Node,
    /// Backgrounds behind edge labels
    Label,
    /// All text
    Text,
}

impl RenderLayer {
    /// Returns a human-readable name for this layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Cluster => "cluster",
            Self::Edge => "edge",
            Self::Node => "node",
            Self::Label => "label",
            Self::Text => "text",
        }
    }
}

/// Represents SVG nodes grouped by rendering layer.
///
/// Within a layer nodes keep the order in which they were added.
#[derive(Debug, Default)]
pub struct LayeredOutput {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl LayeredOutput {
    /// Creates a new empty `LayeredOutput`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single node to the specified layer.
    pub fn add_to_layer(&mut self, layer: RenderLayer, node: SvgNode) {
        self.items.push((layer, node));
    }

    /// Merges all layers from another `LayeredOutput` into this one.
    pub fn merge(&mut self, other: LayeredOutput) {
        self.items.extend(other.items);
    }

    /// Returns `true` if there are no nodes in any layer.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of nodes across all layers.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Renders all layers to SVG groups, consuming the output.
    ///
    /// Each non-empty layer becomes a `<g>` element with a `data-layer`
    /// attribute. The sort is stable, so insertion order is kept inside a layer.
    pub fn render(mut self) -> Vec<SvgNode> {
        if self.is_empty() {
            return Vec::new();
        }

        self.items.sort_by_key(|(layer, _)| *layer);

        let mut result = Vec::new();
        let mut current_layer = self.items[0].0;
        let mut current_group = svg_element::Group::new().set("data-layer", current_layer.name());

        for (layer, node) in self.items {
            if layer != current_layer {
                result.push(Box::new(current_group) as SvgNode);
                trace!(layer = current_layer.name(); "Layer group closed");

                current_layer = layer;
                current_group = svg_element::Group::new().set("data-layer", layer.name());
            }

            current_group = current_group.add(node);
        }

        result.push(Box::new(current_group) as SvgNode);

        result
    }
}
