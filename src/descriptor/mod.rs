//! Project descriptors (manifests) and their dependency-source mode.
//!
//! A descriptor is the full text of one project's manifest. Its mode is never
//! stored: it is derived from the text every time it is needed.
//!
//! - [`Locator`] maps a project identifier to its manifest path (pure, no I/O).
//! - [`detect`] classifies descriptor text as [`SourceMode::Local`] or
//!   [`SourceMode::Published`].
//! - [`block`] parses and renders the managed block that the transition
//!   engine rewrites.

pub mod block;

pub use block::{BlockGrammar, LineEnding, ManagedBlock};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Where a dependency is resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// The dependency resolves from a local filesystem path
    Local,
    /// The dependency resolves from the package registry
    Published,
    /// A managed block whose header and declaration disagree
    Unrecognized,
}

impl SourceMode {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceMode::Local => "local",
            SourceMode::Published => "published",
            SourceMode::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify descriptor text by looking for an uncommented `[section]` header.
///
/// Any line whose first non-blank text is the header counts; commented-out
/// headers and a missing section both mean [`SourceMode::Published`].
/// Never returns [`SourceMode::Unrecognized`].
pub fn detect(text: &str, section: &str) -> SourceMode {
    let header = format!("[{}]", section);
    let enabled = text
        .lines()
        .map(str::trim_start)
        .any(|line| line.starts_with(&header));

    if enabled {
        SourceMode::Local
    } else {
        SourceMode::Published
    }
}

/// Resolves project identifiers to descriptor paths under a base directory.
#[derive(Debug, Clone)]
pub struct Locator {
    base_dir: PathBuf,
    manifest: String,
}

impl Locator {
    pub fn new(base_dir: impl Into<PathBuf>, manifest: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            manifest: manifest.into(),
        }
    }

    /// Directory of a project; the working directory for its resync.
    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.base_dir.join(project)
    }

    /// Path of a project's descriptor. Does not check that it exists.
    pub fn locate(&self, project: &str) -> PathBuf {
        self.project_dir(project).join(&self.manifest)
    }
}

/// Read a descriptor, mapping a missing file to [`Error::NotFound`].
pub fn read_descriptor(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })
}
