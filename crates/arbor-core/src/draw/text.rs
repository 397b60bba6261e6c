//! Text definitions and deterministic text measurement.
//!
//! - [`TextDefinition`] - reusable text style
//! - [`Text`] - a renderable label combining content with a [`TextDefinition`]
//!
//! Measurement never consults installed fonts. Each character has a fixed
//! advance expressed in ems, so the same label measures the same on every
//! machine.
//!
//! ```
//! # use arbor_core::draw::{TextDefinition, Text};
//! let mut style = TextDefinition::new();
//! style.set_font_size(14);
//!
//! let text = Text::new(&style, "Hello, Diagram!");
//! assert!(text.calculate_size().width() > 0.0);
//! ```

use svg::{node::Text as SvgText, node::element as svg_element};
use unicode_width::UnicodeWidthChar;

use crate::{
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer},
    geometry::{Insets, Point, Size},
};

/// Points to pixels at 96 DPI, rounded the way SVG user agents do.
const PT_TO_PX: f32 = 1.33;
/// Line height as a multiple of the pixel font size.
const LINE_HEIGHT_FACTOR: f32 = 1.15;

/// Defines the visual style of text elements.
///
/// | Property | Default |
/// |----------|---------|
/// | Font family | `"Helvetica, Arial, sans-serif"` |
/// | Font size | `13` |
/// | Background color | `None` |
/// | Text color | `None` (SVG default, black) |
/// | Padding | Zero on all sides |
#[derive(Debug, Clone)]
pub struct TextDefinition {
    font_family: String,
    font_size: u16,
    background_color: Option<Color>,
    color: Option<Color>,
    padding: Insets,
}

impl TextDefinition {
    /// Creates a new text definition with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the font size in points.
    pub fn set_font_size(&mut self, size: u16) {
        self.font_size = size;
    }

    /// Sets the font family written to the `font-family` attribute.
    ///
    /// The family does not influence measurement.
    pub fn set_font_family(&mut self, family: &str) {
        self.font_family = family.to_string();
    }

    /// Sets the background color. `None` renders no background.
    pub fn set_background_color(&mut self, color: Option<Color>) {
        self.background_color = color;
    }

    /// Sets the fill color of the text.
    pub fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }

    /// Sets the padding around the text content.
    ///
    /// Padding counts toward the measured size even without a background.
    pub fn set_padding(&mut self, padding: Insets) {
        self.padding = padding;
    }

    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn background_color(&self) -> Option<Color> {
        self.background_color
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn padding(&self) -> Insets {
        self.padding
    }

    /// Font size in pixels.
    pub fn font_size_px(&self) -> f32 {
        f32::from(self.font_size) * PT_TO_PX
    }

    /// Height of a single line in pixels.
    pub fn line_height(&self) -> f32 {
        self.font_size_px() * LINE_HEIGHT_FACTOR
    }
}

impl Default for TextDefinition {
    fn default() -> Self {
        Self {
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 13,
            background_color: None,
            color: None,
            padding: Insets::default(),
        }
    }
}

/// Advance of a single character in ems.
fn char_advance(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '!' | '|' | '.' | ',' | ':' | ';' | '\'' => 0.28,
        ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' => 0.36,
        'm' | 'w' | 'M' | 'W' | '@' => 0.85,
        c if c.is_ascii_uppercase() || c.is_ascii_digit() => 0.65,
        c if c.is_ascii() => 0.55,
        // East Asian wide characters occupy two cells
        c => 0.55 * c.width().unwrap_or(0) as f32,
    }
}

/// Width of a single line in pixels, without padding.
fn line_width(line: &str, definition: &TextDefinition) -> f32 {
    let ems: f32 = line.chars().map(char_advance).sum();
    ems * definition.font_size_px()
}

/// A renderable text element.
#[derive(Debug, Clone)]
pub struct Text<'a> {
    definition: &'a TextDefinition,
    content: &'a str,
}

impl<'a> Text<'a> {
    pub fn new(definition: &'a TextDefinition, content: &'a str) -> Self {
        Self {
            definition,
            content,
        }
    }

    pub fn content(&self) -> &str {
        self.content
    }

    /// Total size including padding.
    pub fn calculate_size(&self) -> Size {
        self.calculate_size_without_padding()
            .add_padding(self.definition.padding())
    }

    fn calculate_size_without_padding(&self) -> Size {
        if self.content.is_empty() {
            return Size::default();
        }

        let mut width: f32 = 0.0;
        let mut line_count = 0;
        for line in self.content.lines() {
            width = width.max(line_width(line, self.definition));
            line_count += 1;
        }

        Size::new(width, line_count as f32 * self.definition.line_height())
    }
}

impl Drawable for Text<'_> {
    fn render_to_layers(&self, position: Point) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let lines: Vec<&str> = self.content.lines().collect();
        if lines.is_empty() {
            return output;
        }

        let line_height = self.definition.line_height();
        let total_height = line_height * lines.len() as f32;
        // First tspan's dy moves down one line, so start one line above the block.
        let y_offset = -(total_height + line_height) / 2.0;

        let mut rendered_text = svg_element::Text::new("")
            .set("x", position.x())
            .set("y", position.y() + y_offset)
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", self.definition.font_family())
            .set("font-size", self.definition.font_size());

        if let Some(color) = self.definition.color() {
            rendered_text = rendered_text
                .set("fill", color.to_string())
                .set("fill-opacity", color.alpha());
        }

        for line in lines {
            let tspan = svg_element::TSpan::new("")
                .set("x", position.x())
                .set("dy", line_height)
                .add(SvgText::new(line));
            rendered_text = rendered_text.add(tspan);
        }

        if let Some(bg_color) = self.definition.background_color() {
            let bg_bounds = position.to_bounds(self.calculate_size());
            let bg_min_point = bg_bounds.min_point();

            let bg = svg_element::Rectangle::new()
                .set("x", bg_min_point.x())
                .set("y", bg_min_point.y())
                .set("width", bg_bounds.width())
                .set("height", bg_bounds.height())
                .set("fill", bg_color.to_string())
                .set("fill-opacity", bg_color.alpha())
                .set("rx", 3.0);

            output.add_to_layer(RenderLayer::Label, Box::new(bg));
        }

        output.add_to_layer(RenderLayer::Text, Box::new(rendered_text));
        output
    }

    fn size(&self) -> Size {
        self.calculate_size()
    }
}
