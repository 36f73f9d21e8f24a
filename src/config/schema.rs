//! TOML schema for `sdk-toggle.toml`.
//!
//! This module provides:
//! - Rust structs representing the TOML schema
//! - Parsing from TOML text
//! - Validation functions
//! - Default values matching the example repository layout
//!
//! # TOML Schema
//!
//! ```toml
//! projects = ["fastapi-langchain", "langchain-aws", "openai-simple"]
//! manifest = "pyproject.toml"
//! section = "tool.uv.sources"
//! notice = [
//!     "Uncomment the section below to use the local spyglass-sdk for development",
//!     "This assumes spyglass-sdk is located at ../../spyglass-sdk relative to this file",
//! ]
//!
//! [dependency]
//! name = "spyglass-ai"
//! path = "../../spyglass-sdk"
//! editable = true
//!
//! [resync]
//! command = ["uv", "sync"]
//! timeout_secs = 300
//! ```
//!
//! Every key is optional; missing keys fall back to the defaults above
//! (`timeout_secs` defaults to no timeout).

use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// Projects managed when no config file overrides the list.
pub const DEFAULT_PROJECTS: [&str; 3] = ["fastapi-langchain", "langchain-aws", "openai-simple"];

/// Top-level configuration for the toggle tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToggleConfig {
    /// Project directory names, relative to the base directory
    pub projects: Vec<String>,

    /// Manifest file name inside each project directory
    pub manifest: String,

    /// Name of the manifest section holding the local source override
    pub section: String,

    /// The two explanatory comment lines preceding the section, without the `#` marker
    pub notice: [String; 2],

    /// The dependency whose source is switched
    pub dependency: DependencyConfig,

    /// External command re-syncing a project environment
    pub resync: ResyncConfig,
}

/// The dependency declaration written into the managed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DependencyConfig {
    /// Package name as it appears on the left of the declaration
    pub name: String,

    /// Local path the package resolves from in local mode
    pub path: String,

    /// Whether the local install is editable
    pub editable: bool,
}

/// Settings for the environment resync step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResyncConfig {
    /// Program followed by its arguments
    pub command: Vec<String>,

    /// Kill the resync process after this many seconds (none = wait indefinitely)
    pub timeout_secs: Option<u64>,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            projects: DEFAULT_PROJECTS.iter().map(|p| p.to_string()).collect(),
            manifest: "pyproject.toml".to_string(),
            section: "tool.uv.sources".to_string(),
            notice: [
                "Uncomment the section below to use the local spyglass-sdk for development"
                    .to_string(),
                "This assumes spyglass-sdk is located at ../../spyglass-sdk relative to this file"
                    .to_string(),
            ],
            dependency: DependencyConfig::default(),
            resync: ResyncConfig::default(),
        }
    }
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            name: "spyglass-ai".to_string(),
            path: "../../spyglass-sdk".to_string(),
            editable: true,
        }
    }
}

impl Default for ResyncConfig {
    fn default() -> Self {
        Self {
            command: vec!["uv".to_string(), "sync".to_string()],
            timeout_secs: None,
        }
    }
}

impl ToggleConfig {
    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> crate::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.projects.is_empty() {
            return Err("projects must list at least one project".to_string());
        }
        for project in &self.projects {
            if !is_relative_name(project) {
                return Err(format!(
                    "project '{}' must be a relative path inside the base directory",
                    project
                ));
            }
        }

        if !is_relative_name(&self.manifest) || Path::new(&self.manifest).components().count() != 1
        {
            return Err(format!(
                "manifest must be a plain file name, got '{}'",
                self.manifest
            ));
        }

        if self.section.trim().is_empty() {
            return Err("section must not be empty".to_string());
        }
        if self.notice.iter().any(|line| line.trim().is_empty()) {
            return Err("notice lines must not be empty".to_string());
        }
        if self.notice.iter().any(|line| line.contains('\n')) {
            return Err("notice lines must be single lines".to_string());
        }

        if self.dependency.name.trim().is_empty() {
            return Err("dependency.name must not be empty".to_string());
        }
        if self.dependency.path.trim().is_empty() {
            return Err("dependency.path must not be empty".to_string());
        }

        match self.resync.command.first() {
            Some(program) if !program.trim().is_empty() => {}
            _ => return Err("resync.command must name a program".to_string()),
        }
        if self.resync.timeout_secs == Some(0) {
            return Err("resync.timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// True for a non-empty path made only of normal components.
fn is_relative_name(s: &str) -> bool {
    !s.trim().is_empty()
        && Path::new(s)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
