//! Common test utilities for sdk-toggle integration tests.
//!
//! Provides `TestEnv`, a temporary base directory holding one subdirectory
//! per managed project plus an `sdk-toggle.toml` that replaces `uv sync` with
//! a shell command appending the project name to `resync.log`.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

pub const ENABLED_MANIFEST: &str = r#"[project]
name = "example"
version = "0.1.0"
dependencies = ["spyglass-ai>=0.3.0", "langchain>=0.3"]

# Uncomment the section below to use the local spyglass-sdk for development
# This assumes spyglass-sdk is located at ../../spyglass-sdk relative to this file
[tool.uv.sources]
spyglass-ai = { path = "../../spyglass-sdk", editable = true }
"#;

pub const DISABLED_MANIFEST: &str = r#"[project]
name = "example"
version = "0.1.0"
dependencies = ["spyglass-ai>=0.3.0", "langchain>=0.3"]

# Uncomment the section below to use the local spyglass-sdk for development
# This assumes spyglass-sdk is located at ../../spyglass-sdk relative to this file
# [tool.uv.sources]
# spyglass-ai = { path = "../../spyglass-sdk", editable = true }
"#;

/// Resync command recording the project directory name in `<root>/resync.log`.
pub const LOGGING_RESYNC: &str = r#"basename "$(pwd)" >> ../resync.log"#;

/// An isolated base directory for one test.
pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    /// Create an empty base directory with no config file.
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
        }
    }

    /// Create a base directory managing `projects` with the logging resync command.
    pub fn with_projects(projects: &[&str]) -> Self {
        let env = Self::new();
        env.write_config(projects, &["sh", "-c", LOGGING_RESYNC]);
        env
    }

    /// Write `sdk-toggle.toml` for `projects` and the given resync command.
    pub fn write_config(&self, projects: &[&str], resync: &[&str]) {
        let quote = |items: &[&str]| {
            items
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let content = format!(
            "projects = [{}]\n\n[resync]\ncommand = [{}]\n",
            quote(projects),
            quote(resync)
        );
        fs::write(self.path().join("sdk-toggle.toml"), content).unwrap();
    }

    pub fn write_manifest(&self, project: &str, content: &str) -> PathBuf {
        let dir = self.path().join(project);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pyproject.toml");
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read_manifest(&self, project: &str) -> String {
        fs::read_to_string(self.path().join(project).join("pyproject.toml")).unwrap()
    }

    /// Project names recorded by the resync command, in call order.
    pub fn resync_log(&self) -> Vec<String> {
        match fs::read_to_string(self.path().join("resync.log")) {
            Ok(content) => content.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Get a Command for the sdk-toggle binary rooted at this environment.
    pub fn toggle(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_sdk-toggle"));
        cmd.current_dir(self.path());
        cmd.env_remove("RUST_LOG");
        cmd.env_remove("SDK_TOGGLE_ROOT");
        cmd.env_remove("SDK_TOGGLE_CONFIG");
        cmd
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
