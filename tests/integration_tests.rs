//! Integration tests for the jobpool CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn jobpool(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("jobpool").unwrap();
    cmd.current_dir(dir.path());
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("JOBPOOL_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

/// Test CLI binary exists and responds to --help
#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    jobpool(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("worker"));
}

/// Test CLI responds to --version
#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    jobpool(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("jobpool"));
}

/// Test invalid subcommand shows error
#[test]
fn test_invalid_subcommand() {
    let dir = TempDir::new().unwrap();
    jobpool(&dir)
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_run_reports_all_jobs() {
    let dir = TempDir::new().unwrap();
    let output = jobpool(&dir)
        .args(["run", "--workers", "3", "--jobs", "40", "--job-ms", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["workers"], 3);
    assert_eq!(report["jobs"], 40);
    assert_eq!(report["completed"], 40);
    assert_eq!(report["failed"], 0);
    assert!(report["peak_busy_workers"].as_u64().unwrap() <= 3);
}

#[test]
fn test_run_without_executors_uses_job_counter() {
    let dir = TempDir::new().unwrap();
    jobpool(&dir)
        .args(["run", "-w", "2", "-j", "10", "--job-ms", "0", "-e", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("all jobs completed"));
}

#[test]
fn test_run_fails_when_jobs_panic() {
    let dir = TempDir::new().unwrap();
    let output = jobpool(&dir)
        .args(["run", "-w", "2", "-j", "12", "--job-ms", "0", "--fail", "3", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["failed"], 3);
    assert_eq!(report["completed"], 9);
    assert!(String::from_utf8_lossy(&output.stderr).contains("3 of 12 jobs failed"));
}

#[cfg(unix)]
#[test]
fn test_abort_policy_kills_process() {
    let dir = TempDir::new().unwrap();
    let output = jobpool(&dir)
        .args(["run", "-w", "2", "-j", "4", "--job-ms", "0", "--fail", "1"])
        .env("JOBPOOL_ON_PANIC", "abort")
        .output()
        .unwrap();

    // terminated by SIGABRT rather than exiting with a code
    assert_eq!(output.status.code(), None);
    assert!(String::from_utf8_lossy(&output.stderr).contains("injected failure in job 0"));
}

#[test]
fn test_helper_clears_ambient_pool_settings() {
    let dir = TempDir::new().unwrap();
    let output = jobpool(&dir)
        .args(["config", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["workers"], 0);
    assert_eq!(config["thread_name"], "jobpool-worker");
    assert_eq!(config["on_panic"], "report");
}

#[test]
fn test_run_reads_repo_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("jobpool.toml"), "workers = 2\n").unwrap();

    let output = jobpool(&dir)
        .args(["run", "-j", "5", "--job-ms", "0", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["workers"], 2);
}

#[test]
fn test_config_show_formats() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("custom.toml");
    fs::write(&config_path, "workers = 4\nthread_name = \"indexer\"\n").unwrap();

    jobpool(&dir)
        .arg("config")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("workers = 4"))
        .stdout(predicate::str::contains("indexer"));

    let output = jobpool(&dir)
        .args(["config", "--format", "json"])
        .env("JOBPOOL_WORKERS", "6")
        .output()
        .unwrap();
    assert!(output.status.success());
    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["workers"], 6);
    assert_eq!(config["resolved_workers"], 6);
    assert_eq!(config["on_panic"], "report");
}

#[test]
fn test_config_rejects_invalid_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("jobpool.toml"), "thread_name = \"\"\n").unwrap();

    jobpool(&dir)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("thread name"));
}
