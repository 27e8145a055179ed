//! End-to-end CLI tests for the taskdl binary.
//!
//! Only paths that exit on their own are exercised here; a successful start
//! serves until signalled.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("taskdl").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch URL download service"))
        .stdout(predicate::str::contains("--workers"))
        .stdout(predicate::str::contains("--queue-capacity"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("taskdl").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("taskdl"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("taskdl").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// Test that a zero worker count is rejected before anything starts.
#[test]
fn test_binary_zero_workers_rejected() {
    let mut cmd = Command::cargo_bin("taskdl").unwrap();
    cmd.args(["--workers", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("0"));
}

/// Test that an oversized queue capacity is rejected.
#[test]
fn test_binary_queue_capacity_over_max_rejected() {
    let mut cmd = Command::cargo_bin("taskdl").unwrap();
    cmd.args(["--queue-capacity", "10001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("10001"));
}

/// Test that an unreadable snapshot is fatal at startup.
#[test]
fn test_binary_corrupt_store_fails_startup() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("tasks.json");
    std::fs::write(&store_path, "{ not json").unwrap();

    let mut cmd = Command::cargo_bin("taskdl").unwrap();
    cmd.arg("--store")
        .arg(&store_path)
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .args(["--listen", "127.0.0.1:0", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load task store"));
}
