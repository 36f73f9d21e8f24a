//! sdk-toggle CLI - switch example projects between a local SDK and the
//! published release.

use clap::Parser;
use clap::error::ErrorKind;
use sdk_toggle::cli::{Cli, USAGE};
use sdk_toggle::commands::{self, CommandResult, ToggleCommand, Workspace};
use sdk_toggle::config::load_config;
use sdk_toggle::logging;
use sdk_toggle::resync::CommandResync;
use std::env;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprintln!("{}", e.render().to_string().trim_end());
            eprintln!("\n{}", USAGE);
            process::exit(1);
        }
    };

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    // Missing or unknown command word is the one hard failure.
    let command = match cli.command.as_deref().map(ToggleCommand::parse) {
        Some(Ok(command)) => command,
        Some(Err(e)) => {
            eprintln!("{}\n", e);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
        None => {
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let base_dir = resolve_base_dir(cli.root);

    match run(command, &base_dir, cli.config.as_deref()) {
        Ok(report) => {
            if cli.json {
                println!("{}", report.to_json());
            } else {
                println!("{}", report.to_human());
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run(
    command: ToggleCommand,
    base_dir: &Path,
    config_path: Option<&Path>,
) -> Result<commands::Report, sdk_toggle::Error> {
    let loaded = load_config(base_dir, config_path)?;
    tracing::debug!(base = %base_dir.display(), command = ?command, "starting");

    let resync = CommandResync::from_config(&loaded.config.resync);
    let workspace = Workspace::new(base_dir, loaded.config)?;

    Ok(commands::run(command, &workspace, &resync))
}

/// Resolve the base directory: --root flag > SDK_TOGGLE_ROOT env var > current directory.
///
/// An explicit path must exist.
fn resolve_base_dir(explicit_path: Option<PathBuf>) -> PathBuf {
    match explicit_path {
        Some(path) => {
            if !path.is_dir() {
                eprintln!(
                    "Error: Specified root directory does not exist: {}",
                    path.display()
                );
                process::exit(1);
            }
            path
        }
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
