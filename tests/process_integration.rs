//! Integration tests for the process command
//!
//! The live tests require configured transcription and generation providers.
//! Run with: cargo test --test process_integration -- --ignored

use std::process::Command;

#[test]
#[ignore] // Requires configured providers and real API keys
fn test_process_audio_file() {
    // This test requires:
    // 1. A valid provider config (`lectern provider configure`)
    // 2. A test audio file at tests/fixtures/lecture.wav

    let output = Command::new("cargo")
        .args([
            "run",
            "--",
            "process",
            "tests/fixtures/lecture.wav",
            "--no-publish",
        ])
        .output()
        .expect("Failed to run command");

    assert!(output.status.success(), "Command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.is_empty(), "No notes output");
}

#[test]
#[ignore] // Requires configured providers and real API keys
fn test_process_json_output() {
    let output = Command::new("cargo")
        .args([
            "run",
            "--",
            "process",
            "tests/fixtures/lecture.wav",
            "--no-publish",
            "--format",
            "json",
        ])
        .output()
        .expect("Failed to run command");

    assert!(output.status.success(), "Command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output is not valid JSON");
    assert!(parsed.get("main_topic").is_some(), "Missing main_topic");
}

#[test]
fn test_process_missing_file() {
    let output = Command::new("cargo")
        .args(["run", "--", "process", "nonexistent.wav"])
        .output()
        .expect("Failed to run command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("not found"),
        "Expected 'not found' error, got: {}",
        stderr
    );
}

#[test]
fn test_process_empty_directory() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new("cargo")
        .args(["run", "--", "process"])
        .arg(dir.path())
        .output()
        .expect("Failed to run command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("No audio files found"),
        "Expected 'No audio files found' error, got: {}",
        stderr
    );
}

#[test]
fn test_version_command() {
    let output = Command::new("cargo")
        .args(["run", "--", "version"])
        .output()
        .expect("Failed to run command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Lectern"), "Unexpected output: {}", stdout);
}
