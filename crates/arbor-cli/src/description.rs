//! TOML diagram descriptions.
//!
//! A description is replayed onto a [`GraphBuilder`] in file order: top-level
//! nodes, then clusters (recursively, each with its own nodes, sub-clusters,
//! edges and chains), then top-level edges and chains. An edge may only
//! reference nodes declared before it in that order.
//!
//! ```toml
//! [diagram]
//! title = "Web service"
//! direction = "left_right"
//! output = "web.svg"
//!
//! [[nodes]]
//! id = "user"
//! label = "User"
//!
//! [[clusters]]
//! id = "backend"
//! label = "Backend"
//! nodes = [{ id = "api", label = "API", icon = "aws.compute.ec2" }]
//!
//! [[edges]]
//! from = "user"
//! to = "api"
//! label = "HTTPS"
//! ```

use std::path::PathBuf;

use log::debug;
use serde::Deserialize;

use arbor::{
    ArrowHead, DiagramOptions, Direction, EdgeSpec, EdgeStyle, Graph, GraphBuilder, LineStyle,
    color::Color,
};

use crate::error::CliError;

/// A parsed diagram description.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Description {
    #[serde(default)]
    diagram: DiagramSection,
    #[serde(default)]
    nodes: Vec<NodeEntry>,
    #[serde(default)]
    clusters: Vec<ClusterEntry>,
    #[serde(default)]
    edges: Vec<EdgeEntry>,
    #[serde(default)]
    chains: Vec<ChainEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DiagramSection {
    #[serde(default)]
    title: String,
    direction: Option<String>,
    output: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeEntry {
    id: String,
    /// Defaults to the id; an explicit empty label gives a blank node.
    label: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClusterEntry {
    id: String,
    label: Option<String>,
    /// Attach to an already declared cluster instead of the enclosing one.
    parent: Option<String>,
    #[serde(default)]
    nodes: Vec<NodeEntry>,
    #[serde(default)]
    clusters: Vec<ClusterEntry>,
    #[serde(default)]
    edges: Vec<EdgeEntry>,
    #[serde(default)]
    chains: Vec<ChainEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EdgeEntry {
    from: String,
    to: String,
    label: Option<String>,
    arrow: Option<String>,
    line: Option<String>,
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChainEntry {
    nodes: Vec<String>,
    arrow: Option<String>,
    line: Option<String>,
    color: Option<String>,
}

/// Members of one scope, borrowed from the root or from a cluster entry.
struct Members<'a> {
    nodes: &'a [NodeEntry],
    clusters: &'a [ClusterEntry],
    edges: &'a [EdgeEntry],
    chains: &'a [ChainEntry],
}

impl Description {
    /// # Errors
    ///
    /// [`CliError::Description`] with the offending span when `src` is not a
    /// valid description.
    pub fn parse(src: &str) -> Result<Self, CliError> {
        toml::from_str(src).map_err(|err| CliError::description(err, src))
    }

    /// The `diagram.output` path, if any.
    pub fn output(&self) -> Option<&str> {
        self.diagram.output.as_deref()
    }

    /// Replays the description onto a fresh builder.
    ///
    /// # Errors
    ///
    /// The first [`CliError::InvalidValue`] or builder error encountered.
    pub fn build(&self, output: impl Into<PathBuf>) -> Result<Graph, CliError> {
        let direction = match &self.diagram.direction {
            Some(direction) => direction.parse::<Direction>()?,
            None => Direction::default(),
        };
        let options = DiagramOptions::new(self.diagram.title.clone(), direction, output);

        let mut builder = GraphBuilder::new(options)?;
        declare_members(
            &mut builder,
            Members {
                nodes: &self.nodes,
                clusters: &self.clusters,
                edges: &self.edges,
                chains: &self.chains,
            },
        )?;

        let graph = builder.build()?;
        debug!(
            nodes = graph.node_count(),
            clusters = graph.cluster_count() - 1,
            edges = graph.edges().len();
            "Description replayed"
        );
        Ok(graph)
    }
}

fn declare_members(builder: &mut GraphBuilder, members: Members<'_>) -> Result<(), CliError> {
    for node in members.nodes {
        let label = node.label.as_deref().unwrap_or(&node.id);
        builder.declare_node(&node.id, label, node.icon.as_deref())?;
    }

    for cluster in members.clusters {
        let label = cluster.label.as_deref().unwrap_or(&cluster.id);
        let mut scope = match &cluster.parent {
            Some(parent) => builder.enter_cluster_in(&cluster.id, label, parent)?,
            None => builder.enter_cluster(&cluster.id, label)?,
        };
        declare_members(
            &mut scope,
            Members {
                nodes: &cluster.nodes,
                clusters: &cluster.clusters,
                edges: &cluster.edges,
                chains: &cluster.chains,
            },
        )?;
    }

    for edge in members.edges {
        let style = edge_style(
            edge.arrow.as_deref(),
            edge.line.as_deref(),
            edge.color.as_deref(),
        )?;
        let mut spec = EdgeSpec::new(&edge.from, &edge.to).with_style(style);
        if let Some(label) = &edge.label {
            spec = spec.with_label(label);
        }
        builder.declare_edge(spec)?;
    }

    for chain in members.chains {
        let style = edge_style(
            chain.arrow.as_deref(),
            chain.line.as_deref(),
            chain.color.as_deref(),
        )?;
        let ids: Vec<&str> = chain.nodes.iter().map(String::as_str).collect();
        builder.declare_chain(&ids, style)?;
    }

    Ok(())
}

fn edge_style(
    arrow: Option<&str>,
    line: Option<&str>,
    color: Option<&str>,
) -> Result<EdgeStyle, CliError> {
    let mut style = EdgeStyle::new();
    if let Some(arrow) = arrow {
        style = style.with_arrow(arrow.parse::<ArrowHead>()?);
    }
    if let Some(line) = line {
        style = style.with_line(line.parse::<LineStyle>()?);
    }
    if let Some(color) = color {
        let parsed = Color::new(color).map_err(|reason| CliError::InvalidValue {
            field: "color".to_string(),
            value: color.to_string(),
            reason,
        })?;
        style = style.with_color(parsed);
    }
    Ok(style)
}
