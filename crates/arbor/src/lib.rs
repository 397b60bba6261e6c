//! Arbor - declarative diagram-as-code for architecture diagrams.
//!
//! A diagram is declared through a [`GraphBuilder`] as nodes, nested
//! clusters and directed edges, then pushed through four stages that run
//! strictly in sequence:
//!
//! 1. [`GraphBuilder`] validates ids and references and produces a [`Graph`];
//! 2. [`LayoutEngine`] assigns every node and cluster a box;
//! 3. [`EdgeRouter`] computes a path for every edge;
//! 4. [`Renderer`] draws the result into a single SVG document.
//!
//! [`Pipeline`] bundles the last three stages behind one validated
//! configuration.

pub mod config;

mod builder;
mod error;
mod export;
mod layout;
mod model;
mod routing;

pub use arbor_core::{color, draw, geometry};

pub use builder::{ClusterScope, EdgeSpec, GraphBuilder};
pub use error::{ArborError, CycleWarning, IdKind};
pub use export::Renderer;
pub use layout::{ClusterLayout, Layout, LayoutEngine, NodeLayout};
pub use model::{
    ArrowHead, Cluster, ClusterId, DiagramOptions, Direction, Edge, EdgeStyle, Graph, LineStyle,
    Member, Node,
};
pub use routing::{EdgeRouter, Route};

use std::path::Path;

use log::{debug, info};

use config::AppConfig;

/// Lays out, routes and renders built graphs with one configuration.
///
/// Every call works on its arguments only; nothing is cached between calls.
///
/// # Examples
///
/// ```rust
/// use arbor::{DiagramOptions, Direction, EdgeSpec, GraphBuilder, Pipeline, config::AppConfig};
///
/// # fn main() -> Result<(), arbor::ArborError> {
/// let options = DiagramOptions::new("Demo", Direction::TopDown, "demo.svg");
/// let mut builder = GraphBuilder::new(options)?;
/// builder.declare_node("a", "A", None)?;
/// builder.declare_node("b", "B", None)?;
/// builder.declare_edge(EdgeSpec::new("a", "b"))?;
/// let graph = builder.build()?;
///
/// let pipeline = Pipeline::new(AppConfig::default())?;
/// let svg = pipeline.render_svg(&graph);
/// assert!(svg.contains("data-node-id"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: AppConfig,
    engine: LayoutEngine,
    router: EdgeRouter,
    renderer: Renderer,
}

impl Pipeline {
    /// # Errors
    ///
    /// [`ArborError::Configuration`] if `config` fails validation.
    pub fn new(config: AppConfig) -> Result<Self, ArborError> {
        config.validate()?;
        debug!(config:?; "Pipeline configured");

        Ok(Self {
            engine: LayoutEngine::new(&config),
            router: EdgeRouter::new(&config),
            renderer: Renderer::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn layout(&self, graph: &Graph) -> Layout {
        self.engine.layout(graph)
    }

    pub fn route(&self, graph: &Graph, layout: &Layout) -> Vec<Route> {
        self.router.route(graph, layout)
    }

    /// Runs layout, routing and rendering and returns the SVG document.
    pub fn render_svg(&self, graph: &Graph) -> String {
        let layout = self.layout(graph);
        let routes = self.route(graph, &layout);
        self.renderer.render_svg(graph, &layout, &routes)
    }

    /// Renders `graph` to the output path from its [`DiagramOptions`].
    ///
    /// # Errors
    ///
    /// [`ArborError::Render`] if the file cannot be written.
    pub fn render_to_file(&self, graph: &Graph) -> Result<Layout, ArborError> {
        self.render_to_path(graph, graph.options().output_path())
    }

    /// Renders `graph` to `path`, ignoring the output path of the graph.
    ///
    /// Returns the layout so callers can inspect its cycle warnings.
    ///
    /// # Errors
    ///
    /// [`ArborError::Render`] if the file cannot be written.
    pub fn render_to_path(&self, graph: &Graph, path: &Path) -> Result<Layout, ArborError> {
        info!(path:?; "Rendering diagram");

        let layout = self.layout(graph);
        let routes = self.route(graph, &layout);
        self.renderer.render_to_file(graph, &layout, &routes, path)?;

        info!(
            path:?,
            nodes = graph.node_count(),
            edges = routes.len(),
            warnings = layout.warnings().len();
            "Diagram written"
        );
        Ok(layout)
    }
}
