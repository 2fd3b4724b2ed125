//! CLI integration tests
//!
//! Runs the compiled binary with a scrubbed environment and checks exit codes
//! and what it prints.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn buildgate(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_buildgate"))
        .args(args)
        .env_clear()
        .env("BUILD_SOURCESDIRECTORY", dir)
        .env("BUILD_ARTIFACTSTAGINGDIRECTORY", dir.join("staging"))
        .envs(env.iter().copied())
        .output()
        .expect("Failed to run buildgate")
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    let output = buildgate(dir.path(), &["--help"], &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("run"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_config_masks_credentials() {
    let dir = TempDir::new().unwrap();
    let output = buildgate(
        dir.path(),
        &["config", "--pmd"],
        &[
            ("BUILDGATE_SONAR_ENABLED", "true"),
            ("BUILDGATE_SONAR_HOST_URL", "http://sonar:9000"),
            ("BUILDGATE_SONAR_PASSWORD", "hunter2"),
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Analysis Tools: PMD"));
    assert!(stdout.contains("SonarQube: http://sonar:9000"));
    assert!(!stdout.contains("hunter2"));
}

#[test]
fn test_invalid_build_tool_fails() {
    let dir = TempDir::new().unwrap();
    let output = buildgate(dir.path(), &["config"], &[("BUILDGATE_BUILD_TOOL", "ant")]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ant"));
}

#[test]
fn test_run_with_missing_tool_reports_failure() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
    let missing = dir.path().join("no-such-mvn");

    let output = buildgate(
        dir.path(),
        &["run", "--tool-path", missing.to_str().unwrap()],
        &[],
    );

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("##vso[task.complete result=Failed;]"));
}

#[test]
fn test_run_rejects_sonar_without_host() {
    let dir = TempDir::new().unwrap();
    let output = buildgate(dir.path(), &["run", "--sonar"], &[]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("task.complete result=Failed"));
}
