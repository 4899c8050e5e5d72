//! Configuration discovery and loading

use super::types::Settings;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File name looked up in the working directory and the per-user config dir
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Subdirectory of the platform config dir (`~/.config` on Linux)
pub const CONFIG_DIR_NAME: &str = "mm-user-mgmt";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Error parsing configuration file {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Explicitly named configuration file does not exist
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// No configuration file anywhere, but one is required
    #[error("No configuration file found (use --config, MMU_CONFIG or ./{CONFIG_FILE_NAME})")]
    Missing,

    /// A setting the command needs is absent
    #[error("Missing required setting '{0}' in configuration")]
    MissingSetting(&'static str),

    /// A required environment variable is absent or empty
    #[error("Missing required environment variable: {0}")]
    MissingEnv(&'static str),

    /// `.env` exists but could not be read
    #[error("Failed to load {path}: {source}")]
    Dotenv {
        path: PathBuf,
        source: dotenvy::Error,
    },
}

/// Locate the configuration file
///
/// Priority (highest to lowest):
/// 1. `explicit` (the `--config` flag)
/// 2. `MMU_CONFIG` environment variable
/// 3. `config.yaml` in the current directory
/// 4. `<config_dir>/mm-user-mgmt/config.yaml`
///
/// An explicit path (1 or 2) that does not exist is an error; the implicit
/// locations are simply skipped.
pub fn find_config(
    explicit: Option<&Path>,
    current_dir: &Path,
    config_dir: Option<&Path>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        return require_exists(path.to_path_buf()).map(Some);
    }

    if let Some(path) = std::env::var_os("MMU_CONFIG").filter(|v| !v.is_empty()) {
        return require_exists(PathBuf::from(path)).map(Some);
    }

    let local = current_dir.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Ok(Some(local));
    }

    if let Some(dir) = config_dir {
        let global = dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        if global.is_file() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

fn require_exists(path: PathBuf) -> Result<PathBuf, ConfigError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ConfigError::NotFound(path))
    }
}

/// Load settings from a YAML file. An empty file yields the defaults.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::YamlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Find and load settings
///
/// With `required`, the absence of any configuration file is an error;
/// otherwise defaults are returned.
pub fn resolve_settings(
    explicit: Option<&Path>,
    current_dir: &Path,
    config_dir: Option<&Path>,
    required: bool,
) -> Result<Settings, ConfigError> {
    match find_config(explicit, current_dir, config_dir)? {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            load_settings(&path)
        }
        None if required => Err(ConfigError::Missing),
        None => {
            debug!("No configuration file found, using defaults");
            Ok(Settings::default())
        }
    }
}

/// [`resolve_settings`] from the process working directory and the platform config dir
pub fn discover_settings(
    explicit: Option<&Path>,
    required: bool,
) -> Result<Settings, ConfigError> {
    let current_dir = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    let config_dir = dirs::config_dir();
    resolve_settings(explicit, &current_dir, config_dir.as_deref(), required)
}
