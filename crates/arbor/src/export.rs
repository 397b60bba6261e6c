//! Output artifacts.
//!
//! The only backend is SVG. Rendering is a pure function of the graph, its
//! layout and its routes; writing goes through a temporary file in the target
//! directory that replaces the target only once complete.

mod svg;

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use log::{error, info};
use tempfile::NamedTempFile;

use crate::error::ArborError;

pub use self::svg::Renderer;

/// Writes `contents` to `path` atomically.
///
/// # Errors
///
/// [`ArborError::Render`] carrying `path` when the directory does not exist
/// or is not writable. No partial file is left behind.
pub(crate) fn write_atomically(path: &Path, contents: &str) -> Result<(), ArborError> {
    let parent: PathBuf = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    info!(path:? = path; "Writing diagram");

    let mut file = NamedTempFile::new_in(&parent).map_err(|err| {
        error!(path:? = path, err:err; "Failed to create temporary file");
        ArborError::render(path, err)
    })?;

    file.write_all(contents.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|err| {
            error!(path:? = path, err:err; "Failed to write diagram");
            ArborError::render(path, err)
        })?;

    file.persist(path).map_err(|err| {
        error!(path:? = path, err:err = err.error; "Failed to move diagram into place");
        ArborError::render(path, err.error)
    })?;

    Ok(())
}
