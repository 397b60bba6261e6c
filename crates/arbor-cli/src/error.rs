//! Errors of the command-line front end.

use std::{io, path::PathBuf};

use thiserror::Error;

use arbor::ArborError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration file `{}` not found", .0.display())]
    MissingConfig(PathBuf),

    #[error("invalid configuration file `{}`: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// The description is not valid TOML or does not match the expected shape.
    #[error("invalid diagram description: {message}")]
    Description {
        message: String,
        src: String,
        span: Option<std::ops::Range<usize>>,
    },

    /// A value inside an otherwise well-formed description is rejected.
    #[error("invalid `{field}` value `{value}`: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Arbor(#[from] ArborError),
}

impl CliError {
    /// Diagnostic code; library errors keep their own taxonomy tag.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "arbor_cli::io",
            Self::MissingConfig(_) | Self::Config { .. } => "arbor_cli::config",
            Self::Description { .. } | Self::InvalidValue { .. } => "arbor_cli::description",
            Self::Arbor(err) => err.code(),
        }
    }

    pub(crate) fn description(err: toml::de::Error, src: &str) -> Self {
        Self::Description {
            message: err.message().to_string(),
            src: src.to_string(),
            span: err.span(),
        }
    }
}
