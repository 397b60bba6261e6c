//! Configuration types for Arbor diagram rendering.
//!
//! All types implement [`serde::Deserialize`] with a default for every field,
//! so a configuration file only needs to mention what it changes.
//!
//! - [`AppConfig`] - top-level configuration
//! - [`LayoutConfig`] - spacing, padding and crossing-reduction effort
//! - [`RoutingConfig`] - edge shape, parallel spacing and the obstacle fallback
//! - [`StyleConfig`] - colors and fonts
//!
//! ```
//! # use arbor::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.layout().node_spacing(), 40.0);
//! ```

use serde::Deserialize;

use arbor_core::color::Color;

use crate::error::ArborError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    routing: RoutingConfig,

    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    pub fn new(layout: LayoutConfig, routing: RoutingConfig, style: StyleConfig) -> Self {
        Self {
            layout,
            routing,
            style,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// [`ArborError::Configuration`] naming the first offending option.
    pub fn validate(&self) -> Result<(), ArborError> {
        self.layout.validate()?;
        self.routing.validate()?;
        self.style.validate()
    }
}

fn require_positive(option: &str, value: f32) -> Result<(), ArborError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ArborError::configuration(
            option,
            format!("must be a positive number, found {value}"),
        ))
    }
}

fn require_non_negative(option: &str, value: f32) -> Result<(), ArborError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ArborError::configuration(
            option,
            format!("must not be negative, found {value}"),
        ))
    }
}

/// Spacing and crossing-reduction settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap between neighbouring items of one rank.
    node_spacing: f32,
    /// Minimum gap between consecutive ranks.
    rank_spacing: f32,
    /// Padding between a cluster border and its content.
    cluster_padding: f32,
    /// Number of barycenter sweeps, alternating down and up.
    ordering_passes: usize,
    node_min_width: f32,
    node_min_height: f32,
    /// Side of the square icon badge.
    icon_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 40.0,
            rank_spacing: 60.0,
            cluster_padding: 20.0,
            ordering_passes: 8,
            node_min_width: 100.0,
            node_min_height: 44.0,
            icon_size: 32.0,
        }
    }
}

impl LayoutConfig {
    pub fn node_spacing(&self) -> f32 {
        self.node_spacing
    }

    pub fn rank_spacing(&self) -> f32 {
        self.rank_spacing
    }

    pub fn cluster_padding(&self) -> f32 {
        self.cluster_padding
    }

    pub fn ordering_passes(&self) -> usize {
        self.ordering_passes
    }

    pub fn node_min_width(&self) -> f32 {
        self.node_min_width
    }

    pub fn node_min_height(&self) -> f32 {
        self.node_min_height
    }

    pub fn icon_size(&self) -> f32 {
        self.icon_size
    }

    pub fn with_node_spacing(mut self, spacing: f32) -> Self {
        self.node_spacing = spacing;
        self
    }

    pub fn with_rank_spacing(mut self, spacing: f32) -> Self {
        self.rank_spacing = spacing;
        self
    }

    pub fn with_cluster_padding(mut self, padding: f32) -> Self {
        self.cluster_padding = padding;
        self
    }

    pub fn with_ordering_passes(mut self, passes: usize) -> Self {
        self.ordering_passes = passes;
        self
    }

    fn validate(&self) -> Result<(), ArborError> {
        require_positive("layout.node_spacing", self.node_spacing)?;
        require_positive("layout.rank_spacing", self.rank_spacing)?;
        require_non_negative("layout.cluster_padding", self.cluster_padding)?;
        require_positive("layout.node_min_width", self.node_min_width)?;
        require_positive("layout.node_min_height", self.node_min_height)?;
        require_non_negative("layout.icon_size", self.icon_size)
    }
}

/// Geometry used to draw an edge path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeShape {
    /// Axis-aligned segments through a channel between the endpoints.
    #[default]
    Orthogonal,
    /// The orthogonal control polygon drawn as a cubic Bézier.
    Curved,
    /// A single segment.
    Straight,
}

/// What the router does when no obstacle-free candidate exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingFallback {
    /// Draw a straight segment between the anchors.
    #[default]
    Straight,
    /// Keep the direct route even though it crosses an obstacle.
    Overlap,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    edge_shape: EdgeShape,
    /// Lateral distance between parallel edges.
    parallel_spacing: f32,
    fallback: RoutingFallback,
    /// Distance kept between detours and the boxes they avoid.
    clearance: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            edge_shape: EdgeShape::default(),
            parallel_spacing: 12.0,
            fallback: RoutingFallback::default(),
            clearance: 10.0,
        }
    }
}

impl RoutingConfig {
    pub fn edge_shape(&self) -> EdgeShape {
        self.edge_shape
    }

    pub fn parallel_spacing(&self) -> f32 {
        self.parallel_spacing
    }

    pub fn fallback(&self) -> RoutingFallback {
        self.fallback
    }

    pub fn clearance(&self) -> f32 {
        self.clearance
    }

    pub fn with_edge_shape(mut self, shape: EdgeShape) -> Self {
        self.edge_shape = shape;
        self
    }

    pub fn with_parallel_spacing(mut self, spacing: f32) -> Self {
        self.parallel_spacing = spacing;
        self
    }

    pub fn with_fallback(mut self, fallback: RoutingFallback) -> Self {
        self.fallback = fallback;
        self
    }

    fn validate(&self) -> Result<(), ArborError> {
        require_positive("routing.parallel_spacing", self.parallel_spacing)?;
        require_non_negative("routing.clearance", self.clearance)
    }
}

/// Colors and fonts. Colors are CSS color strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    background_color: Option<String>,
    node_fill: String,
    node_stroke: String,
    cluster_fill: String,
    cluster_stroke: String,
    edge_color: String,
    text_color: String,
    font_family: String,
    font_size: u16,
    title_font_size: u16,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: Some("white".to_string()),
            node_fill: "#ffffff".to_string(),
            node_stroke: "#5b6770".to_string(),
            cluster_fill: "#f3f6fa".to_string(),
            cluster_stroke: "#9aa7b5".to_string(),
            edge_color: "#4a5560".to_string(),
            text_color: "#1f2328".to_string(),
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 13,
            title_font_size: 18,
        }
    }
}

fn parse_color(option: &str, value: &str) -> Result<Color, ArborError> {
    Color::new(value).map_err(|reason| ArborError::configuration(option, reason))
}

impl StyleConfig {
    /// Background of the whole diagram, `None` for transparent.
    ///
    /// # Errors
    ///
    /// [`ArborError::Configuration`] if the color string does not parse.
    pub fn background_color(&self) -> Result<Option<Color>, ArborError> {
        self.background_color
            .as_deref()
            .map(|color| parse_color("style.background_color", color))
            .transpose()
    }

    pub fn node_fill(&self) -> Result<Color, ArborError> {
        parse_color("style.node_fill", &self.node_fill)
    }

    pub fn node_stroke(&self) -> Result<Color, ArborError> {
        parse_color("style.node_stroke", &self.node_stroke)
    }

    pub fn cluster_fill(&self) -> Result<Color, ArborError> {
        parse_color("style.cluster_fill", &self.cluster_fill)
    }

    pub fn cluster_stroke(&self) -> Result<Color, ArborError> {
        parse_color("style.cluster_stroke", &self.cluster_stroke)
    }

    pub fn edge_color(&self) -> Result<Color, ArborError> {
        parse_color("style.edge_color", &self.edge_color)
    }

    pub fn text_color(&self) -> Result<Color, ArborError> {
        parse_color("style.text_color", &self.text_color)
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    pub fn title_font_size(&self) -> u16 {
        self.title_font_size
    }

    fn validate(&self) -> Result<(), ArborError> {
        self.background_color()?;
        self.node_fill()?;
        self.node_stroke()?;
        self.cluster_fill()?;
        self.cluster_stroke()?;
        self.edge_color()?;
        self.text_color()?;
        if self.font_size == 0 {
            return Err(ArborError::configuration("style.font_size", "must be positive"));
        }
        if self.title_font_size == 0 {
            return Err(ArborError::configuration(
                "style.title_font_size",
                "must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.layout().rank_spacing(), 60.0);
        assert_eq!(config.layout().ordering_passes(), 8);
        assert_eq!(config.routing().parallel_spacing(), 12.0);
        assert_eq!(config.routing().edge_shape(), EdgeShape::Orthogonal);
        assert_eq!(config.routing().fallback(), RoutingFallback::Straight);
    }

    #[test]
    fn test_non_positive_spacing_is_rejected() {
        let config = AppConfig::new(
            LayoutConfig::default().with_node_spacing(0.0),
            RoutingConfig::default(),
            StyleConfig::default(),
        );
        match config.validate().unwrap_err() {
            ArborError::Configuration { option, .. } => assert_eq!(option, "layout.node_spacing"),
            other => panic!("unexpected error: {other:?}"),
        }

        let config = AppConfig::new(
            LayoutConfig::default(),
            RoutingConfig::default().with_parallel_spacing(-3.0),
            StyleConfig::default(),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_ordering_passes_is_valid() {
        let config = AppConfig::new(
            LayoutConfig::default().with_ordering_passes(0),
            RoutingConfig::default(),
            StyleConfig::default(),
        );
        assert!(config.validate().is_ok());
        assert_eq!(config.layout().ordering_passes(), 0);
    }

    #[test]
    fn test_nan_spacing_is_rejected() {
        let layout = LayoutConfig::default().with_rank_spacing(f32::NAN);
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_bad_color_is_rejected() {
        let style = StyleConfig {
            edge_color: "definitely-not-a-color".to_string(),
            ..StyleConfig::default()
        };
        match style.validate().unwrap_err() {
            ArborError::Configuration { option, .. } => assert_eq!(option, "style.edge_color"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_transparent_background() {
        let style = StyleConfig {
            background_color: None,
            ..StyleConfig::default()
        };
        assert_eq!(style.background_color().unwrap(), None);
    }
}
