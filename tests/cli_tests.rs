//! CLI Integration Tests for Scout
//!
//! Runs the built binary. Nothing here reaches the network: every case stops
//! at argument parsing or configuration checks.

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run scout inside `dir` with credentials scrubbed from the environment
fn run_scout(args: &[&str], dir: &TempDir) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scout"))
        .args(args)
        .current_dir(dir.path())
        .env_remove("OPENAI_API_KEY")
        .env_remove("BING_SUBSCRIPTION_KEY")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute scout")
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    let output = run_scout(&["--help"], &dir);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Scout"));
    assert!(stdout.contains("--mode"));
    assert!(stdout.contains("--temperature"));
    assert!(stdout.contains("continuous"));
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    let output = run_scout(&["--version"], &dir);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("scout"));
}

#[test]
fn test_unknown_mode_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = run_scout(&["--mode", "sometimes", "hi"], &dir);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("sometimes"));
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_out_of_range_temperature_fails_before_any_request() {
    let dir = TempDir::new().unwrap();
    let output = run_scout(&["--temperature", "3.5", "hi"], &dir);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("temperature"));
}

#[test]
fn test_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("scout.toml"), "[model\nmodel = ").unwrap();
    let output = run_scout(&["hi"], &dir);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid configuration"));
}

#[test]
fn test_missing_api_key() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("scout.toml"),
        "[model]\napi_key_env = \"SCOUT_CLI_TEST_KEY\"\n",
    )
    .unwrap();
    let output = run_scout(&["--no-color", "hi"], &dir);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("SCOUT_CLI_TEST_KEY"));
}
