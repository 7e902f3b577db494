//! Integration tests for the maplog binary.
//!
//! These tests verify end-to-end behavior including:
//! - Logging workouts through the form workflow
//! - Validation of submitted values
//! - Persistence across invocations
//! - Selection, export and reset

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary, isolated from the user's config
fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("maplog"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"));
    cmd
}

fn read_log(temp_dir: &TempDir) -> Vec<serde_json::Value> {
    let path = temp_dir.path().join("data/workouts.json");
    let content = fs::read_to_string(&path).expect("Failed to read workouts.json");
    serde_json::from_str(&content).expect("workouts.json is not a JSON array")
}

fn add_run(temp_dir: &TempDir) {
    cli(temp_dir)
        .args(["add", "--at", "39.0,-12.0", "--type", "running"])
        .args(["--distance", "5.2", "--duration", "24", "--cadence", "178"])
        .assert()
        .success();
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Map-based running and cycling log"));
}

#[test]
fn test_add_running_workout() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["add", "--at", "39.0,-12.0", "--type", "running"])
        .args(["--distance", "5.2", "--duration", "24", "--cadence", "178"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout logged"))
        .stdout(predicate::str::contains("Running on"))
        .stdout(predicate::str::contains("4.6 min/km"));

    let log = read_log(&temp_dir);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0]["type"], "running");
    assert_eq!(log[0]["coordinates"], serde_json::json!([39.0, -12.0]));
    assert_eq!(log[0]["cadence"], 178.0);
    assert_eq!(log[0]["interactionCount"], 0);
}

#[test]
fn test_add_cycling_with_negative_elevation() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["add", "--at", "39.0,-12.0", "--type", "cycling"])
        .args(["--distance", "27", "--duration", "95", "--elevation", "-40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("17.1 km/h"));

    let log = read_log(&temp_dir);
    assert_eq!(log[0]["type"], "cycling");
    assert_eq!(log[0]["elevationGainM"], -40.0);
}

#[test]
fn test_invalid_input_is_rejected() {
    let temp_dir = setup_test_dir();
    add_run(&temp_dir);

    cli(&temp_dir)
        .args(["add", "--at", "39.0,-12.0", "--type", "running"])
        .args(["--distance", "5", "--duration", "-1", "--cadence", "178"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Inputs have to be positive numbers"));

    cli(&temp_dir)
        .args(["add", "--at", "39.0,-12.0", "--type", "running"])
        .args(["--distance", "abc", "--duration", "24", "--cadence", "178"])
        .assert()
        .failure();

    // Log is unchanged
    assert_eq!(read_log(&temp_dir).len(), 1);
}

#[test]
fn test_unknown_type_is_rejected() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["add", "--at", "39.0,-12.0", "--type", "rowing"])
        .args(["--distance", "5", "--duration", "20"])
        .assert()
        .failure();

    assert!(!temp_dir.path().join("data/workouts.json").exists());
}

#[test]
fn test_list_shows_newest_first() {
    let temp_dir = setup_test_dir();
    add_run(&temp_dir);
    cli(&temp_dir)
        .args(["add", "--at", "39.1,-12.1", "--type", "cycling"])
        .args(["--distance", "27", "--duration", "95", "--elevation", "523"])
        .assert()
        .success();

    let output = cli(&temp_dir).arg("list").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();

    let running = stdout.find("Running on").expect("running entry listed");
    let cycling = stdout.find("Cycling on").expect("cycling entry listed");
    assert!(cycling < running);
    assert!(stdout.contains("2 workouts"));
}

#[test]
fn test_southern_hemisphere_coordinates() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["add", "--at", "-33.86,151.2", "--type", "running"])
        .args(["--distance", "5.2", "--duration", "24", "--cadence", "178"])
        .assert()
        .success();

    let log = read_log(&temp_dir);
    assert_eq!(log[0]["coordinates"], serde_json::json!([-33.86, 151.2]));
    let id = log[0]["id"].as_str().unwrap().to_string();

    cli(&temp_dir)
        .args(["--from", "-33.86,151.2", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 workouts"));

    cli(&temp_dir)
        .args(["--from", "-33.86,151.2", "show", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Map centered on"));

    assert_eq!(read_log(&temp_dir)[0]["interactionCount"], 1);
}

#[test]
fn test_list_empty() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts logged yet"));
}

#[test]
fn test_show_counts_interactions() {
    let temp_dir = setup_test_dir();
    add_run(&temp_dir);
    let id = read_log(&temp_dir)[0]["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        cli(&temp_dir)
            .args(["--from", "39.0,-12.0", "show", id.as_str()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Map centered on"));
    }

    assert_eq!(read_log(&temp_dir)[0]["interactionCount"], 2);
}

#[test]
fn test_show_unknown_id_is_noop() {
    let temp_dir = setup_test_dir();
    add_run(&temp_dir);
    let before = fs::read_to_string(temp_dir.path().join("data/workouts.json")).unwrap();

    cli(&temp_dir)
        .args(["--from", "39.0,-12.0", "show", "0000000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No workout with id"));

    let after = fs::read_to_string(temp_dir.path().join("data/workouts.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_show_without_position_fails() {
    let temp_dir = setup_test_dir();
    add_run(&temp_dir);
    let id = read_log(&temp_dir)[0]["id"].as_str().unwrap().to_string();

    cli(&temp_dir)
        .args(["show", id.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not get your position"));

    assert_eq!(read_log(&temp_dir)[0]["interactionCount"], 0);
}

#[test]
fn test_position_from_config() {
    let temp_dir = setup_test_dir();
    add_run(&temp_dir);
    let id = read_log(&temp_dir)[0]["id"].as_str().unwrap().to_string();

    let config_path = temp_dir.path().join("maplog.toml");
    fs::write(&config_path, "[location]\nlatitude = 39.0\nlongitude = -12.0\n").unwrap();

    cli(&temp_dir)
        .arg("--config")
        .arg(&config_path)
        .args(["show", id.as_str()])
        .assert()
        .success();
}

#[test]
fn test_export_csv() {
    let temp_dir = setup_test_dir();
    add_run(&temp_dir);
    let out = temp_dir.path().join("export/workouts.csv");

    cli(&temp_dir)
        .arg("export")
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 workouts"));

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("id,type,"));
    assert!(csv.contains(",running,"));
}

#[test]
fn test_reset_clears_log() {
    let temp_dir = setup_test_dir();
    add_run(&temp_dir);
    add_run(&temp_dir);

    cli(&temp_dir)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 workouts"));

    assert!(!Path::new(&temp_dir.path().join("data/workouts.json")).exists());
    cli(&temp_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts logged yet"));
}
