//! Environment resync after a descriptor edit.
//!
//! The resync step runs an external command (by default `uv sync`) in the
//! project directory so the installed packages follow the manifest. Output is
//! captured, not streamed. Every failure mode is reported as a
//! [`ResyncOutcome`]; none of them is an error for the caller.

use crate::config::ResyncConfig;
use serde::Serialize;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Result of one resync attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResyncOutcome {
    Succeeded,
    /// The command ran and exited unsuccessfully
    Failed { code: Option<i32>, stderr: String },
    /// The program is not installed
    ToolMissing { program: String },
    /// The command was killed after the configured timeout
    TimedOut { timeout_secs: u64 },
    /// The command could not be started for another reason
    SpawnFailed { error: String },
}

impl ResyncOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, ResyncOutcome::Succeeded)
    }

    /// One-line description for warnings.
    pub fn describe(&self) -> String {
        match self {
            ResyncOutcome::Succeeded => "succeeded".to_string(),
            ResyncOutcome::Failed { code, stderr } => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    format!("exited with {}", code)
                } else {
                    format!("exited with {}: {}", code, stderr)
                }
            }
            ResyncOutcome::ToolMissing { program } => {
                format!("'{}' command not found. Please install {} first.", program, program)
            }
            ResyncOutcome::TimedOut { timeout_secs } => {
                format!("timed out after {}s", timeout_secs)
            }
            ResyncOutcome::SpawnFailed { error } => format!("could not start: {}", error),
        }
    }
}

/// Something that can re-sync a project environment.
pub trait Resync {
    /// Human-readable form of the command, e.g. `uv sync`.
    fn display_command(&self) -> String;

    /// Re-sync the project rooted at `project_dir`.
    fn resync(&self, project_dir: &Path) -> ResyncOutcome;
}

/// Runs an external program with the project directory as working directory.
#[derive(Debug, Clone)]
pub struct CommandResync {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandResync {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Build from config. The config is validated, so the command is non-empty.
    pub fn from_config(config: &ResyncConfig) -> Self {
        let mut parts = config.command.iter().cloned();
        let program = parts.next().unwrap_or_else(|| "uv".to_string());
        Self::new(
            program,
            parts.collect(),
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    fn run(&self, project_dir: &Path) -> std::io::Result<ResyncOutcome> {
        // Capture into temp files so a chatty child can't block on a full pipe
        // while we wait on it.
        let mut stdout = tempfile::tempfile()?;
        let mut stderr = tempfile::tempfile()?;

        let spawned = Command::new(&self.program)
            .args(&self.args)
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout.try_clone()?))
            .stderr(Stdio::from(stderr.try_clone()?))
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(ResyncOutcome::ToolMissing {
                    program: self.program.clone(),
                });
            }
            Err(e) => {
                return Ok(ResyncOutcome::SpawnFailed {
                    error: e.to_string(),
                });
            }
        };

        let status = match self.timeout {
            Some(timeout) => match child.wait_timeout(timeout)? {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(ResyncOutcome::TimedOut {
                        timeout_secs: timeout.as_secs(),
                    });
                }
            },
            None => child.wait()?,
        };

        let out = read_all(&mut stdout)?;
        tracing::debug!(
            dir = %project_dir.display(),
            stdout = %out.trim_end(),
            "resync output"
        );

        if status.success() {
            Ok(ResyncOutcome::Succeeded)
        } else {
            Ok(ResyncOutcome::Failed {
                code: status.code(),
                stderr: read_all(&mut stderr)?,
            })
        }
    }
}

impl Resync for CommandResync {
    fn display_command(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn resync(&self, project_dir: &Path) -> ResyncOutcome {
        tracing::info!(dir = %project_dir.display(), command = %self.display_command(), "running resync");
        let outcome = self.run(project_dir).unwrap_or_else(|e| ResyncOutcome::SpawnFailed {
            error: e.to_string(),
        });
        if !outcome.succeeded() {
            tracing::warn!(dir = %project_dir.display(), "resync failed: {}", outcome.describe());
        }
        outcome
    }
}

fn read_all(file: &mut File) -> std::io::Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
