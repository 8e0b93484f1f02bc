//! Corruption recovery tests for the basal binary.
//!
//! These tests verify the system can handle:
//! - Malformed rows in either data file
//! - Out-of-range values written by hand
//! - Missing and empty files
//! - Invalid configuration

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("basal"));
    cmd.arg("--data-dir")
        .arg(data_dir)
        .arg("--config")
        .arg(data_dir.join("config.toml"));
    cmd
}

fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("config.toml"), "").expect("Failed to write config");
    temp_dir
}

#[test]
fn test_malformed_rows_are_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("temperatures.csv"),
        "date,temperature,notes,cervical_mucus\n\
         2024-01-01,36.1,,\n\
         not-a-date,36.2,,\n\
         2024-01-03,warm,,\n\
         2024-01-04,36.3,,\n",
    )
    .unwrap();

    cli(data_dir)
        .args(["chart", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-01"))
        .stdout(predicate::str::contains("2024-01-04"))
        .stdout(predicate::str::contains("not-a-date").not());
}

#[test]
fn test_out_of_range_rows_are_ignored() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("temperatures.csv"),
        "date,temperature,notes,cervical_mucus\n\
         2024-01-01,36.1,,\n\
         2024-01-02,98.6,,\n",
    )
    .unwrap();

    let output = cli(data_dir)
        .args(["chart", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let points: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(points.as_array().unwrap().len(), 1);
}

#[test]
fn test_unknown_flow_value_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("periods.csv"),
        "date,flow_intensity\n2024-01-01,heavy\n2024-01-02,torrential\n",
    )
    .unwrap();

    cli(data_dir)
        .args(["window", "--cycles", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fertile 2024-01-10"));
}

#[test]
fn test_partial_last_line() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("temperatures.csv"),
        "date,temperature,notes,cervical_mucus\n2024-01-01,36.1,,\n2024-01-0",
    )
    .unwrap();

    // Rewriting keeps the partial line instead of silently dropping it
    cli(data_dir)
        .args(["log", "2024-01-02", "36.2"])
        .assert()
        .success();

    let content = fs::read_to_string(data_dir.join("temperatures.csv")).unwrap();
    let rows: Vec<&str> = content.lines().skip(1).collect();
    assert_eq!(rows, vec!["2024-01-0", "2024-01-01,36.1,,", "2024-01-02,36.2,,"]);

    let output = cli(data_dir)
        .args(["chart", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let points: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(points.as_array().unwrap().len(), 2);
}

#[test]
fn test_log_keeps_unrecognised_rows() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("temperatures.csv"),
        "date,temperature,notes,cervical_mucus
         2024-01-01,36.20,,
         2024-01-02,36.30,,spinnbar
",
    )
    .unwrap();

    cli(data_dir)
        .args(["log", "2024-01-03", "36.4"])
        .assert()
        .success();

    let content = fs::read_to_string(data_dir.join("temperatures.csv")).unwrap();
    assert!(content.contains("2024-01-02,36.30,,spinnbar"));
    assert!(content.contains("2024-01-03,36.4,,"));

    cli(data_dir)
        .args(["remove", "2024-01-01"])
        .assert()
        .success();

    let content = fs::read_to_string(data_dir.join("temperatures.csv")).unwrap();
    assert!(content.contains("2024-01-02,36.30,,spinnbar"));
    assert!(!content.contains("2024-01-01"));
}

#[test]
fn test_unreadable_data_file_fails_log() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::create_dir(data_dir.join("periods.csv")).unwrap();

    cli(data_dir)
        .args(["log", "2024-01-01", "36.4"])
        .assert()
        .failure();

    assert!(!data_dir.join("temperatures.csv").exists());
}

#[test]
fn test_empty_files() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("temperatures.csv"), "").unwrap();
    fs::write(data_dir.join("periods.csv"), "").unwrap();

    cli(data_dir)
        .arg("ovulations")
        .assert()
        .success()
        .stdout(predicate::str::contains("No ovulations found."));
}

#[test]
fn test_missing_data_dir_is_created_on_write() {
    let temp_dir = setup_test_dir();
    let config = temp_dir.path().join("config.toml");
    let data_dir = temp_dir.path().join("nested").join("basal");

    Command::new(assert_cmd::cargo::cargo_bin!("basal"))
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--config")
        .arg(&config)
        .args(["log", "2024-01-01", "36.4"])
        .assert()
        .success();

    assert!(data_dir.join("temperatures.csv").exists());
}

#[test]
fn test_invalid_config_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("config.toml"),
        "[cycle]\ndefault_length = 14\nluteal_phase = 14\n",
    )
    .unwrap();

    cli(data_dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("luteal phase"));
}

#[test]
fn test_unparseable_config_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("config.toml"), "[cycle\ndefault_length = ").unwrap();

    cli(data_dir).arg("status").assert().failure();
}

#[test]
fn test_huge_days_window_is_an_error() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["--today", "2024-05-01", "--days", "1000000000", "status"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--days"));
}

#[test]
fn test_huge_cycle_count_is_an_error() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["window", "--start", "2024-01-01", "--cycles", "5000000"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--cycles"));
}

#[test]
fn test_huge_cycle_length_config_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("config.toml"),
        "[cycle]\ndefault_length = 4000000000\n",
    )
    .unwrap();

    cli(data_dir)
        .args(["window", "--start", "2024-01-01"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cycle length"));
}
