//! Outline and edge strokes.
//!
//! A [`StrokeDefinition`] is a color, a width and a [`StrokeStyle`]. The
//! [`apply_stroke!`](crate::apply_stroke!) macro writes all stroke attributes
//! onto an SVG element at once.
//!
//! ```
//! use arbor_core::color::Color;
//! use arbor_core::draw::StrokeDefinition;
//! use svg::node::element::Path;
//!
//! let stroke = StrokeDefinition::dashed(Color::new("black").unwrap(), 2.0);
//! let path = arbor_core::apply_stroke!(Path::new().set("d", "M 0 0 L 10 10"), &stroke);
//! assert!(path.to_string().contains("stroke-dasharray"));
//! ```

use crate::color::Color;

/// Dash pattern of a stroke.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl StrokeStyle {
    /// `stroke-dasharray` value, `None` for solid lines.
    pub fn dasharray(self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("6,4"),
            Self::Dotted => Some("2,3"),
        }
    }

    /// `stroke-linecap` value. Dots are only visible with round caps.
    pub fn linecap(self) -> &'static str {
        match self {
            Self::Dotted => "round",
            Self::Solid | Self::Dashed => "butt",
        }
    }
}

/// Color, width and dash pattern of a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    style: StrokeStyle,
}

impl StrokeDefinition {
    pub fn new(color: Color, width: f32, style: StrokeStyle) -> Self {
        Self {
            color,
            width,
            style,
        }
    }

    pub fn solid(color: Color, width: f32) -> Self {
        Self::new(color, width, StrokeStyle::Solid)
    }

    pub fn dashed(color: Color, width: f32) -> Self {
        Self::new(color, width, StrokeStyle::Dashed)
    }

    pub fn dotted(color: Color, width: f32) -> Self {
        Self::new(color, width, StrokeStyle::Dotted)
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn with_style(mut self, style: StrokeStyle) -> Self {
        self.style = style;
        self
    }
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self::solid(Color::default(), 1.0)
    }
}

/// Sets `stroke`, `stroke-opacity`, `stroke-width`, `stroke-linecap`,
/// `stroke-linejoin` and, for patterned styles, `stroke-dasharray`.
///
/// Joins are always round so routed corners stay smooth.
#[macro_export]
macro_rules! apply_stroke {
    ($element:expr, $stroke:expr) => {{
        let stroke = $stroke;
        let style = stroke.style();
        let mut elem = $element
            .set("stroke", stroke.color().to_string())
            .set("stroke-opacity", stroke.color().alpha())
            .set("stroke-width", stroke.width())
            .set("stroke-linecap", style.linecap())
            .set("stroke-linejoin", "round");

        if let Some(dasharray) = style.dasharray() {
            elem = elem.set("stroke-dasharray", dasharray);
        }

        elem
    }};
}
