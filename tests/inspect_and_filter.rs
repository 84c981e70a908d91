#![cfg(feature = "integration-tests")]

use std::path::Path;
use std::process::Command;

const TEST_BAG: &str = "tests/data/race_1.bag";

#[test]
fn test_inspect_command() {
    if !Path::new(TEST_BAG).exists() {
        panic!("Test bag file not found. Put a ROS1 bag at {}", TEST_BAG);
    }

    let output = Command::new("cargo")
        .args(["run", "--", "inspect", TEST_BAG])
        .output()
        .expect("Failed to run inspect command");
    assert!(output.status.success(), "Inspect command failed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Topic"), "Output should contain topic column");
    assert!(stdout.contains("Message Type"), "Output should contain type column");
}

#[test]
fn test_filter_dry_run() {
    if !Path::new(TEST_BAG).exists() {
        panic!("Test bag file not found. Put a ROS1 bag at {}", TEST_BAG);
    }
    let out = tempfile::tempdir().unwrap();

    let output = Command::new("cargo")
        .args(["run", "--", "filter", TEST_BAG, "--all", "--dry-run", "--out-dir"])
        .arg(out.path())
        .output()
        .expect("Failed to run filter command with dry-run");
    assert!(output.status.success(), "Filter dry-run failed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rosbag filter"), "Dry-run should print the command");
    assert!(stdout.contains("_filtered_"), "Dry-run should print the output name");
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}
