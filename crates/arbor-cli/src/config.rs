//! Configuration file discovery.
//!
//! Search order:
//! 1. the path given with `--config`;
//! 2. `arbor/config.toml` relative to the working directory;
//! 3. `config.toml` in the platform configuration directory;
//! 4. built-in defaults.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};

use arbor::config::AppConfig;

use crate::error::CliError;

/// Finds and loads the configuration.
///
/// # Errors
///
/// [`CliError::MissingConfig`] if an explicit path does not exist, and
/// [`CliError::Config`] if a found file cannot be read or parsed.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, CliError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path:? = path; "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("arbor/config.toml");
    if local_config.exists() {
        info!(path:? = local_config; "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(dirs) = ProjectDirs::from("com", "arbor", "arbor") {
        let system_config = dirs.config_dir().join("config.toml");
        if system_config.exists() {
            info!(path:? = system_config; "Loading configuration from system path");
            return load_config_file(&system_config);
        }
        debug!(path:? = system_config; "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: &Path) -> Result<AppConfig, CliError> {
    if !path.exists() {
        return Err(CliError::MissingConfig(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|err| CliError::Config {
        path: PathBuf::from(path),
        message: err.to_string(),
    })?;

    toml::from_str(&content).map_err(|err| CliError::Config {
        path: PathBuf::from(path),
        message: err.message().to_string(),
    })
}
