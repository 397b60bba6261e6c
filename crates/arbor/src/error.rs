//! Error types for Arbor operations.
//!
//! [`ArborError`] is the single fatal error type of the pipeline. Every
//! variant carries the offending id or path, and [`ArborError::code`] gives a
//! stable tag that front ends use as a diagnostic code.
//!
//! [`CycleWarning`] is not an error: layout reports it and carries on.

use std::{fmt, io, path::PathBuf, sync::Arc};

use thiserror::Error;

/// Which namespace member an id was declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Node,
    Cluster,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::Cluster => write!(f, "cluster"),
        }
    }
}

/// The main error type for Arbor operations.
///
/// The type is `Clone` so that a poisoned [`GraphBuilder`](crate::GraphBuilder)
/// can hand out its first failure again.
#[derive(Debug, Clone, Error)]
pub enum ArborError {
    #[error("invalid configuration for `{option}`: {reason}")]
    Configuration { option: String, reason: String },

    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: IdKind, id: String },

    #[error("{context} references unknown id `{missing}`")]
    Reference { missing: String, context: String },

    #[error("cannot write diagram to `{}`: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },
}

impl ArborError {
    pub(crate) fn configuration(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            option: option.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn render(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Render {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Stable taxonomy tag of this error, e.g. `arbor::reference`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "arbor::configuration",
            Self::DuplicateId { .. } => "arbor::duplicate_id",
            Self::Reference { .. } => "arbor::reference",
            Self::Render { .. } => "arbor::render",
        }
    }
}

/// A back edge found while ranking.
///
/// The edge closes a cycle through edges declared before it (or is a
/// self-loop). It is excluded from ranking but still routed and rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleWarning {
    pub source: String,
    pub target: String,
    /// Position of the edge in [`Graph::edges`](crate::model::Graph::edges).
    pub edge_index: usize,
}

impl fmt::Display for CycleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "edge #{} `{}` -> `{}` closes a cycle and is drawn as a back edge",
            self.edge_index, self.source, self.target
        )
    }
}
