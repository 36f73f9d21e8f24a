//! CLI argument definitions for sdk-toggle.

use clap::Parser;
use std::path::PathBuf;

/// Usage text printed for a missing or unknown command.
pub const USAGE: &str = "\
Switch example projects between the local SDK checkout and the published release.

Usage:
    sdk-toggle enable    # Enable the local SDK for all projects
    sdk-toggle disable   # Disable the local SDK (use the published version)
    sdk-toggle status    # Show the current status

Projects whose manifest changes are re-synced automatically (`uv sync` by default).
Run `sdk-toggle --help` for options.";

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("SDK_TOGGLE_GIT_COMMIT"),
    " ",
    env!("SDK_TOGGLE_BUILD_TIMESTAMP"),
    ")"
);

/// sdk-toggle - switch projects between a local SDK and the published one.
///
/// Edits the managed `[tool.uv.sources]` block in each project's manifest,
/// then re-syncs every project that changed.
#[derive(Parser, Debug)]
#[command(name = "sdk-toggle")]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Cli {
    /// Command to run: enable, disable or status (case-insensitive)
    #[arg(value_name = "COMMAND")]
    pub command: Option<String>,

    /// Directory containing the managed projects.
    /// Defaults to the current directory. Can also be set via SDK_TOGGLE_ROOT.
    #[arg(short = 'C', long = "root", env = "SDK_TOGGLE_ROOT")]
    pub root: Option<PathBuf>,

    /// Config file to use instead of <root>/sdk-toggle.toml
    #[arg(short, long, env = "SDK_TOGGLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the report as JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,
}
