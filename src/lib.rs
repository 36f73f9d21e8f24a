//! sdk-toggle - switch example projects between a local SDK checkout and the
//! published release.
//!
//! Each managed project carries a manifest (by default `pyproject.toml`) with a
//! small block that either points the SDK dependency at a local path or leaves
//! it commented out so the registry version is used. This library locates those
//! manifests, detects which mode they are in, rewrites the block, and re-syncs
//! the project environment after every change.

pub mod cli;
pub mod commands;
pub mod config;
pub mod descriptor;
pub mod logging;
pub mod resync;
pub mod transition;

use std::path::PathBuf;


/// Library-level error type for sdk-toggle operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Descriptor not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unknown command: {0}")]
    InvalidCommand(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for sdk-toggle operations.
pub type Result<T> = std::result::Result<T, Error>;
