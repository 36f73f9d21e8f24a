//! Logging initialisation via tracing-subscriber.
//!
//! Logs go to stderr so stdout carries only the command report. `RUST_LOG`
//! takes precedence over the level chosen on the command line.

use crate::{Error, Result};
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Default level; per-project warnings are visible without `-v`.
pub const DEFAULT_LEVEL: &str = "warn";

/// Level used with `--verbose`.
pub const VERBOSE_LEVEL: &str = "debug";

/// Pick the fallback filter directive for the verbosity flag.
pub fn level_for(verbose: bool) -> &'static str {
    if verbose { VERBOSE_LEVEL } else { DEFAULT_LEVEL }
}

/// Initialise the global tracing subscriber.
pub fn init(verbose: bool) -> Result<()> {
    let level = level_for(verbose);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| Error::Other(format!("invalid log level '{}': {}", level, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|e| Error::Other(format!("failed to set subscriber: {}", e)))?;

    Ok(())
}
