//! Configuration loading for sdk-toggle.
//!
//! The tool reads an optional `sdk-toggle.toml` from the base directory. When
//! the file is absent the built-in defaults apply, which manage the example
//! projects shipped next to the SDK.
//!
//! ## Precedence
//!
//! 1. `--config <path>` (must exist)
//! 2. `<base>/sdk-toggle.toml`
//! 3. Built-in defaults
//!
//! The resolved [`ToggleConfig`] is handed to the command layer explicitly;
//! nothing here is process-global.

pub mod schema;

pub use schema::{DEFAULT_PROJECTS, DependencyConfig, ResyncConfig, ToggleConfig};

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the base directory.
pub const CONFIG_FILE_NAME: &str = "sdk-toggle.toml";

/// Where a loaded config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicit `--config` path
    Explicit(PathBuf),
    /// Config file found in the base directory
    BaseDir(PathBuf),
    /// Built-in defaults
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Explicit(path) => write!(f, "explicit:{}", path.display()),
            ConfigSource::BaseDir(path) => write!(f, "file:{}", path.display()),
            ConfigSource::Default => write!(f, "default"),
        }
    }
}

/// A validated config with its source.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ToggleConfig,
    pub source: ConfigSource,
}

/// Resolve the config for `base_dir`, honouring an explicit override path.
pub fn load_config(base_dir: &Path, explicit: Option<&Path>) -> Result<LoadedConfig> {
    let (config, source) = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(Error::InvalidConfig(format!(
                    "config file does not exist: {}",
                    path.display()
                )));
            }
            (
                read_config_file(path)?,
                ConfigSource::Explicit(path.to_path_buf()),
            )
        }
        None => {
            let candidate = base_dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                (
                    read_config_file(&candidate)?,
                    ConfigSource::BaseDir(candidate),
                )
            } else {
                (ToggleConfig::default(), ConfigSource::Default)
            }
        }
    };

    config.validate().map_err(Error::InvalidConfig)?;
    tracing::debug!(source = %source, projects = config.projects.len(), "loaded config");

    Ok(LoadedConfig { config, source })
}

fn read_config_file(path: &Path) -> Result<ToggleConfig> {
    let content = fs::read_to_string(path)?;
    ToggleConfig::from_toml_str(&content)
}
