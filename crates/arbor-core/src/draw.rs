//! Drawing primitives shared by the Arbor renderer.
//!
//! - [`LayeredOutput`] / [`RenderLayer`] - z-ordered collection of SVG nodes
//! - [`StrokeDefinition`] - line color, width and dash pattern
//! - [`TextDefinition`] / [`Text`] - measured, renderable labels

mod layer;
mod stroke;
mod text;

pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use stroke::{StrokeDefinition, StrokeStyle};
pub use text::{Text, TextDefinition};

use crate::geometry::{Point, Size};

/// Something that knows its size and can render itself at a position.
///
/// `position` is the center of the drawable.
pub trait Drawable {
    /// Render the drawable centered on `position`.
    fn render_to_layers(&self, position: Point) -> LayeredOutput;

    /// The size the drawable occupies.
    fn size(&self) -> Size;
}
