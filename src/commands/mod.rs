//! Command implementations for the sdk-toggle CLI.
//!
//! Three commands operate on every managed project in order:
//! - `status` - report each project's mode without touching anything
//! - `enable` - switch every project to the local SDK
//! - `disable` - switch every project back to the published SDK
//!
//! Per-project problems (missing descriptor, missing block, failed resync)
//! are recorded in the report and never stop the remaining projects.

use crate::config::ToggleConfig;
use crate::descriptor::{BlockGrammar, Locator, SourceMode, read_descriptor};
use crate::resync::{Resync, ResyncOutcome};
use crate::transition::transition;
use crate::{Error, Result};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json_or_error<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// The three commands accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleCommand {
    Enable,
    Disable,
    Status,
}

impl ToggleCommand {
    /// Parse a command word, case-insensitive.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "enable" => Ok(ToggleCommand::Enable),
            "disable" => Ok(ToggleCommand::Disable),
            "status" => Ok(ToggleCommand::Status),
            _ => Err(Error::InvalidCommand(s.to_string())),
        }
    }

    /// Mode the command moves projects into; `None` for `status`.
    pub fn target(&self) -> Option<SourceMode> {
        match self {
            ToggleCommand::Enable => Some(SourceMode::Local),
            ToggleCommand::Disable => Some(SourceMode::Published),
            ToggleCommand::Status => None,
        }
    }
}

/// Everything a command needs, resolved once at start-up.
#[derive(Debug, Clone)]
pub struct Workspace {
    config: ToggleConfig,
    locator: Locator,
    grammar: BlockGrammar,
}

impl Workspace {
    pub fn new(base_dir: impl Into<PathBuf>, config: ToggleConfig) -> Result<Self> {
        let grammar = BlockGrammar::new(&config)?;
        let locator = Locator::new(base_dir, config.manifest.clone());
        Ok(Self {
            config,
            locator,
            grammar,
        })
    }

    fn projects(&self) -> impl Iterator<Item = &str> {
        self.config.projects.iter().map(String::as_str)
    }
}

/// Per-project state as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Enabled,
    Disabled,
    NotFound,
}

impl ProjectStatus {
    fn from_mode(mode: SourceMode) -> Self {
        match mode {
            SourceMode::Local => ProjectStatus::Enabled,
            _ => ProjectStatus::Disabled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Enabled => "enabled",
            ProjectStatus::Disabled => "disabled",
            ProjectStatus::NotFound => "not found",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            ProjectStatus::Enabled => "✓",
            ProjectStatus::Disabled => "○",
            ProjectStatus::NotFound => "✗",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// === status ===

#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub project: String,
    pub path: PathBuf,
    pub status: ProjectStatus,
    /// Mode of the managed block(s), `None` when the descriptor has none
    pub managed_block: Option<SourceMode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub dependency: String,
    pub projects: Vec<StatusEntry>,
}

impl StatusReport {
    pub fn get(&self, project: &str) -> Option<&StatusEntry> {
        self.projects.iter().find(|e| e.project == project)
    }
}

impl CommandResult for StatusReport {
    fn to_json(&self) -> String {
        json_or_error(self)
    }

    fn to_human(&self) -> String {
        let mut out = format!("Current status of local {} usage:", self.dependency);
        for entry in &self.projects {
            let _ = write!(
                out,
                "\n  {} {}: {}",
                entry.status.icon(),
                entry.project,
                entry.status
            );
            if entry.status != ProjectStatus::NotFound && entry.managed_block.is_none() {
                out.push_str(" (no managed block)");
            }
        }
        out
    }
}

/// Report every project's mode. Never modifies anything and never resyncs.
pub fn status(ws: &Workspace) -> StatusReport {
    let projects = ws
        .projects()
        .map(|project| {
            let path = ws.locator.locate(project);
            let (status, managed_block) = match read_descriptor(&path) {
                Ok(text) => (
                    ProjectStatus::from_mode(ws.grammar.detect(&text)),
                    ws.grammar.block_mode(&text),
                ),
                Err(e) => {
                    log_unreadable(project, &e);
                    (ProjectStatus::NotFound, None)
                }
            };
            StatusEntry {
                project: project.to_string(),
                path,
                status,
                managed_block,
            }
        })
        .collect();

    StatusReport {
        dependency: ws.config.dependency.name.clone(),
        projects,
    }
}

fn log_unreadable(project: &str, error: &Error) {
    match error {
        Error::NotFound(path) => {
            tracing::warn!(project, "{} not found, skipping", path.display())
        }
        other => tracing::warn!(project, "could not read descriptor: {}", other),
    }
}

// === enable / disable ===

/// What happened to one project's descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    /// The descriptor was rewritten
    Changed,
    /// The descriptor was left as it was
    Unchanged,
    /// The descriptor could not be read
    NotFound,
    /// Reading succeeded but writing failed
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleEntry {
    pub project: String,
    pub path: PathBuf,
    pub action: ToggleAction,
    /// Status after the attempt
    pub status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Resync outcome; absent when no resync was attempted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resync: Option<ResyncOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleReport {
    pub command: ToggleCommand,
    pub dependency: String,
    pub resync_command: String,
    pub projects: Vec<ToggleEntry>,
    /// Projects whose descriptor was rewritten
    pub changed: usize,
    /// Changed projects whose resync succeeded
    pub synced: usize,
}

impl ToggleReport {
    pub fn get(&self, project: &str) -> Option<&ToggleEntry> {
        self.projects.iter().find(|e| e.project == project)
    }

    fn target_status(&self) -> ProjectStatus {
        match self.command {
            ToggleCommand::Enable => ProjectStatus::Enabled,
            _ => ProjectStatus::Disabled,
        }
    }
}

impl CommandResult for ToggleReport {
    fn to_json(&self) -> String {
        json_or_error(self)
    }

    fn to_human(&self) -> String {
        let (verb, past) = match self.command {
            ToggleCommand::Enable => ("Enabling", "Enabled"),
            _ => ("Disabling", "Disabled"),
        };
        let mut out = format!("{} local {} for all projects...", verb, self.dependency);

        for entry in &self.projects {
            match entry.action {
                ToggleAction::Changed => {
                    let _ = write!(out, "\n  ✓ {} for {}", past, entry.project);
                }
                ToggleAction::Unchanged if entry.status == self.target_status() => {
                    let _ = write!(out, "\n  - Already {} for {}", entry.status, entry.project);
                }
                _ => {
                    let _ = write!(
                        out,
                        "\n  ✗ Could not update {} (status: {})",
                        entry.project, entry.status
                    );
                }
            }
            if let Some(warning) = &entry.warning {
                let _ = write!(out, "\n    ⚠ {}", warning);
            }
        }

        if self.changed == 0 {
            out.push_str("\n\nNo changes needed.");
            return out;
        }

        let _ = write!(
            out,
            "\n\n✓ Updated {} project(s). Running '{}'...",
            self.changed, self.resync_command
        );
        for entry in self.projects.iter().filter(|e| e.action == ToggleAction::Changed) {
            let _ = write!(out, "\n\nSyncing {}...", entry.project);
            match &entry.resync {
                Some(outcome) if outcome.succeeded() => {
                    let _ = write!(out, "\n  ✓ Synced {}", entry.project);
                }
                Some(outcome) => {
                    let _ = write!(
                        out,
                        "\n  ⚠ Warning: '{}' failed for {}: {}",
                        self.resync_command,
                        entry.project,
                        outcome.describe()
                    );
                }
                None => {}
            }
        }
        if self.synced > 0 {
            let _ = write!(out, "\n\n✓ Successfully synced {} project(s).", self.synced);
        }

        out
    }
}

/// Switch every project to the local SDK.
pub fn enable(ws: &Workspace, resync: &dyn Resync) -> ToggleReport {
    toggle(ws, ToggleCommand::Enable, SourceMode::Local, resync)
}

/// Switch every project back to the published SDK.
pub fn disable(ws: &Workspace, resync: &dyn Resync) -> ToggleReport {
    toggle(ws, ToggleCommand::Disable, SourceMode::Published, resync)
}

/// Transition every project, then resync only the ones that changed.
fn toggle(
    ws: &Workspace,
    command: ToggleCommand,
    target: SourceMode,
    resync: &dyn Resync,
) -> ToggleReport {
    let mut projects: Vec<ToggleEntry> = ws
        .projects()
        .map(|project| transition_project(ws, project, target))
        .collect();

    for entry in projects
        .iter_mut()
        .filter(|e| e.action == ToggleAction::Changed)
    {
        entry.resync = Some(resync.resync(&ws.locator.project_dir(&entry.project)));
    }

    let changed = projects
        .iter()
        .filter(|e| e.action == ToggleAction::Changed)
        .count();
    let synced = projects
        .iter()
        .filter(|e| e.resync.as_ref().is_some_and(ResyncOutcome::succeeded))
        .count();

    ToggleReport {
        command,
        dependency: ws.config.dependency.name.clone(),
        resync_command: resync.display_command(),
        projects,
        changed,
        synced,
    }
}

fn transition_project(ws: &Workspace, project: &str, target: SourceMode) -> ToggleEntry {
    let path = ws.locator.locate(project);
    let mut entry = ToggleEntry {
        project: project.to_string(),
        path: path.clone(),
        action: ToggleAction::Unchanged,
        status: ProjectStatus::NotFound,
        warning: None,
        resync: None,
    };

    match transition(&path, target, &ws.grammar) {
        Ok(result) => {
            entry.action = if result.changed {
                ToggleAction::Changed
            } else {
                ToggleAction::Unchanged
            };
            entry.status = ProjectStatus::from_mode(result.after);

            if !result.reached(target) {
                let warning = if result.blocks == 0 {
                    format!("managed {} block not found in {}", ws.grammar.section(), path.display())
                } else {
                    format!(
                        "{} is still {} after update",
                        path.display(),
                        entry.status
                    )
                };
                tracing::warn!(project, "{}", warning);
                entry.warning = Some(warning);
            }
        }
        Err(e @ Error::NotFound(_)) => {
            log_unreadable(project, &e);
            entry.action = ToggleAction::NotFound;
        }
        Err(e) => {
            tracing::warn!(project, "could not update descriptor: {}", e);
            entry.action = ToggleAction::Failed;
            entry.status = match read_descriptor(&path) {
                Ok(text) => ProjectStatus::from_mode(ws.grammar.detect(&text)),
                Err(_) => ProjectStatus::NotFound,
            };
            entry.warning = Some(e.to_string());
        }
    }

    entry
}

/// Any report the dispatcher can produce.
#[derive(Debug, Clone)]
pub enum Report {
    Status(StatusReport),
    Toggle(ToggleReport),
}

impl CommandResult for Report {
    fn to_json(&self) -> String {
        match self {
            Report::Status(r) => r.to_json(),
            Report::Toggle(r) => r.to_json(),
        }
    }

    fn to_human(&self) -> String {
        match self {
            Report::Status(r) => r.to_human(),
            Report::Toggle(r) => r.to_human(),
        }
    }
}

/// Run `command` across the workspace.
pub fn run(command: ToggleCommand, ws: &Workspace, resync: &dyn Resync) -> Report {
    match command.target() {
        None => Report::Status(status(ws)),
        Some(target) => Report::Toggle(toggle(ws, command, target, resync)),
    }
}
