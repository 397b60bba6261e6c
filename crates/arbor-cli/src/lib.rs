//! Arbor CLI library.
//!
//! Reads a TOML diagram description, renders it with the configured
//! [`Pipeline`] and writes the SVG artifact.

pub mod error_adapter;

mod args;
mod config;
mod description;
mod error;

pub use args::Args;
pub use description::Description;
pub use error::CliError;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};

use arbor::Pipeline;

/// Run the Arbor CLI application.
///
/// # Errors
///
/// Returns [`CliError`] for unreadable input, a bad configuration or
/// description, and any build or render failure. No artifact is written when
/// an error is returned.
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Processing diagram"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let pipeline = Pipeline::new(app_config)?;

    let source = fs::read_to_string(&args.input).map_err(|source| CliError::Io {
        path: PathBuf::from(&args.input),
        source,
    })?;
    let description = Description::parse(&source)?;

    let output = output_path(args, &description);
    let graph = description.build(&output)?;
    let layout = pipeline.render_to_file(&graph)?;

    for warning in layout.warnings() {
        warn!(warning:%; "Cycle in diagram");
    }
    info!(output_file:? = output; "SVG exported successfully");

    Ok(())
}

/// `--output`, else `diagram.output`, else the input path with an `svg`
/// extension.
fn output_path(args: &Args, description: &Description) -> PathBuf {
    args.output
        .as_deref()
        .or(description.output())
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(&args.input).with_extension("svg"))
}
