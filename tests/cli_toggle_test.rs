//! Integration tests for `sdk-toggle status`, `enable` and `disable`.
//!
//! Each test runs the binary against a temporary base directory. The resync
//! step is replaced by a shell command that records which projects it ran in.

#![cfg(unix)]

mod common;

use common::{DISABLED_MANIFEST, ENABLED_MANIFEST, LOGGING_RESYNC, TestEnv};
use predicates::prelude::*;

#[test]
fn test_status_reports_each_project() {
    let env = TestEnv::with_projects(&["alpha", "beta", "gamma"]);
    env.write_manifest("alpha", ENABLED_MANIFEST);
    env.write_manifest("beta", DISABLED_MANIFEST);

    env.toggle()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ alpha: enabled"))
        .stdout(predicate::str::contains("○ beta: disabled"))
        .stdout(predicate::str::contains("✗ gamma: not found"));

    assert!(env.resync_log().is_empty());
    assert_eq!(env.read_manifest("alpha"), ENABLED_MANIFEST);
}

#[test]
fn test_command_is_case_insensitive() {
    let env = TestEnv::with_projects(&["alpha"]);
    env.write_manifest("alpha", DISABLED_MANIFEST);

    env.toggle().arg("StAtUs").assert().success();
    env.toggle().arg("ENABLE").assert().success();
    assert_eq!(env.read_manifest("alpha"), ENABLED_MANIFEST);
}

#[test]
fn test_enable_changes_only_disabled_project() {
    let env = TestEnv::with_projects(&["a", "b", "c"]);
    env.write_manifest("a", DISABLED_MANIFEST);
    env.write_manifest("b", ENABLED_MANIFEST);
    env.write_manifest("c", ENABLED_MANIFEST);

    env.toggle()
        .arg("enable")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Enabled for a"))
        .stdout(predicate::str::contains("- Already enabled for b"))
        .stdout(predicate::str::contains("- Already enabled for c"))
        .stdout(predicate::str::contains("Updated 1 project(s)"))
        .stdout(predicate::str::contains("✓ Synced a"))
        .stdout(predicate::str::contains("Successfully synced 1 project(s)."));

    assert_eq!(env.resync_log(), vec!["a"]);
    assert_eq!(env.read_manifest("a"), ENABLED_MANIFEST);
}

#[test]
fn test_enable_twice_is_idempotent() {
    let env = TestEnv::with_projects(&["a"]);
    env.write_manifest("a", DISABLED_MANIFEST);

    env.toggle().arg("enable").assert().success();
    env.toggle()
        .arg("enable")
        .assert()
        .success()
        .stdout(predicate::str::contains("- Already enabled for a"))
        .stdout(predicate::str::contains("No changes needed."));

    assert_eq!(env.resync_log(), vec!["a"]);
}

#[test]
fn test_enable_disable_round_trip() {
    let env = TestEnv::with_projects(&["a", "b"]);
    env.write_manifest("a", DISABLED_MANIFEST);
    let crlf = DISABLED_MANIFEST.replace('\n', "\r\n");
    env.write_manifest("b", &crlf);

    env.toggle().arg("enable").assert().success();
    env.toggle()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("a: enabled"))
        .stdout(predicate::str::contains("b: enabled"));

    env.toggle()
        .arg("disable")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Disabled for a"))
        .stdout(predicate::str::contains("✓ Disabled for b"));

    assert_eq!(env.read_manifest("a"), DISABLED_MANIFEST);
    assert_eq!(env.read_manifest("b"), crlf);
    assert_eq!(env.resync_log(), vec!["a", "b", "a", "b"]);
}

#[test]
fn test_missing_project_does_not_block_others() {
    let env = TestEnv::with_projects(&["a", "missing", "c"]);
    env.write_manifest("a", ENABLED_MANIFEST);
    env.write_manifest("c", ENABLED_MANIFEST);

    env.toggle()
        .arg("disable")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Disabled for a"))
        .stdout(predicate::str::contains("✗ Could not update missing (status: not found)"))
        .stdout(predicate::str::contains("✓ Disabled for c"))
        .stderr(predicate::str::contains("not found, skipping"));

    assert_eq!(env.resync_log(), vec!["a", "c"]);
}

#[test]
fn test_missing_block_is_reported_not_fatal() {
    let env = TestEnv::with_projects(&["bare"]);
    env.write_manifest("bare", "[project]\nname = \"bare\"\n");

    env.toggle()
        .arg("enable")
        .assert()
        .success()
        .stdout(predicate::str::contains("✗ Could not update bare (status: disabled)"))
        .stdout(predicate::str::contains("No changes needed."));

    assert_eq!(env.read_manifest("bare"), "[project]\nname = \"bare\"\n");
    assert!(env.resync_log().is_empty());
}

#[test]
fn test_missing_resync_tool_is_a_warning() {
    let env = TestEnv::new();
    env.write_config(&["a"], &["sdk-toggle-missing-tool-9c1e"]);
    env.write_manifest("a", DISABLED_MANIFEST);

    env.toggle()
        .arg("enable")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Enabled for a"))
        .stdout(predicate::str::contains(
            "'sdk-toggle-missing-tool-9c1e' command not found",
        ))
        .stdout(predicate::str::contains("Successfully synced").not());

    // The descriptor edit stands even though the resync failed
    assert_eq!(env.read_manifest("a"), ENABLED_MANIFEST);
}

#[test]
fn test_failing_resync_reports_stderr() {
    let env = TestEnv::new();
    env.write_config(&["a", "b"], &["sh", "-c", "echo resolution failed >&2; exit 2"]);
    env.write_manifest("a", ENABLED_MANIFEST);
    env.write_manifest("b", ENABLED_MANIFEST);

    env.toggle()
        .arg("disable")
        .assert()
        .success()
        .stdout(predicate::str::contains("failed for a: exited with 2: resolution failed"))
        .stdout(predicate::str::contains("failed for b: exited with 2: resolution failed"));

    assert_eq!(env.read_manifest("a"), DISABLED_MANIFEST);
    assert_eq!(env.read_manifest("b"), DISABLED_MANIFEST);
}

#[test]
fn test_json_output() {
    let env = TestEnv::with_projects(&["a", "b"]);
    env.write_manifest("a", DISABLED_MANIFEST);
    env.write_manifest("b", ENABLED_MANIFEST);

    let output = env.toggle().args(["--json", "enable"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(json["command"], "enable");
    assert_eq!(json["changed"], 1);
    assert_eq!(json["synced"], 1);
    assert_eq!(json["projects"][0]["action"], "changed");
    assert_eq!(json["projects"][1]["action"], "unchanged");
    assert!(json["projects"][1].get("resync").is_none());
}

#[test]
fn test_root_flag_and_explicit_config() {
    let env = TestEnv::new();
    let projects = env.path().join("examples");
    std::fs::create_dir_all(projects.join("a")).unwrap();
    std::fs::write(projects.join("a").join("pyproject.toml"), DISABLED_MANIFEST).unwrap();
    let config = env.path().join("custom.toml");
    std::fs::write(
        &config,
        format!(
            "projects = ['a']\n\n[resync]\ncommand = ['sh', '-c', '{}']\n",
            LOGGING_RESYNC
        ),
    )
    .unwrap();

    env.toggle()
        .arg("--root")
        .arg(&projects)
        .arg("--config")
        .arg(&config)
        .arg("enable")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Enabled for a"));

    assert_eq!(
        std::fs::read_to_string(projects.join("a").join("pyproject.toml")).unwrap(),
        ENABLED_MANIFEST
    );
    // The resync ran inside examples/a, so the log lands in examples/
    assert_eq!(
        std::fs::read_to_string(projects.join("resync.log")).unwrap().trim(),
        "a"
    );
}
