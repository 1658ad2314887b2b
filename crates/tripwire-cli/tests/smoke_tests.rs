//! Smoke tests for the tripwire CLI
//!
//! None of these launch a browser.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the tripwire binary with a clean environment
fn tripwire() -> Command {
    let mut cmd = Command::cargo_bin("tripwire").expect("tripwire binary should exist");
    cmd.env_remove("TRIPWIRE_BASE_URL")
        .env_remove("CHROMIUM_PATH")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    tripwire()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    tripwire()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_fails() {
    tripwire().assert().failure();
}

#[test]
fn test_run_help_lists_flags() {
    tripwire()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--fail-fast"))
        .stdout(predicate::str::contains("--viewport"))
        .stdout(predicate::str::contains("--base-url"));
}

// ============================================================================
// list
// ============================================================================

#[test]
fn test_list_shows_catalogue() {
    tripwire()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("save-confirmation"))
        .stdout(predicate::str::contains("plan-drag"))
        .stdout(predicate::str::contains("sidebar-scroll-lock"))
        .stdout(predicate::str::contains("font-check"));
}

// ============================================================================
// config
// ============================================================================

#[test]
fn test_config_prints_defaults() {
    tripwire()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url: http://localhost:5173"))
        .stdout(predicate::str::contains("probe_timeout_ms: 5000"));
}

#[test]
fn test_config_layers_file_and_flags() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tripwire.yaml");
    fs::write(&path, "base_url: http://staging:8080\nsettle_ms: 500\n").unwrap();

    tripwire()
        .args(["config", "--config"])
        .arg(&path)
        .args(["--viewport", "375x812", "--timeout", "7000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url: http://staging:8080"))
        .stdout(predicate::str::contains("settle_ms: 500"))
        .stdout(predicate::str::contains("viewport_width: 375"))
        .stdout(predicate::str::contains("probe_timeout_ms: 7000"));
}

#[test]
fn test_config_env_base_url() {
    tripwire()
        .env("TRIPWIRE_BASE_URL", "http://from-env:3000")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://from-env:3000"));
}

#[test]
fn test_config_rejects_bad_url() {
    tripwire()
        .args(["config", "--base-url", "localhost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}

#[test]
fn test_config_rejects_bad_viewport() {
    tripwire()
        .args(["config", "--viewport", "wide"])
        .assert()
        .failure();
}

// ============================================================================
// run (argument validation only)
// ============================================================================

#[test]
fn test_run_unknown_scenario_fails() {
    tripwire()
        .args(["run", "no-such-scenario"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown scenario"));
}

#[test]
fn test_run_without_selection_fails() {
    tripwire()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--all"));
}
