//! End-to-end tests for the analyze command.

use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn run_atc(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_atc"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute atc");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

fn animated_capture() -> String {
    let mut raw = String::new();
    for i in 1..=15 {
        raw.push_str(&format!("✻ Working… ({}s)\n\x1b[2K\x1b[1A", i));
    }
    raw.push_str("result line with actual content\n");
    raw
}

#[test]
fn analyze_reports_duplication() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.raw");
    fs::write(&path, animated_capture()).unwrap();

    let (stdout, _stderr, code) = run_atc(&["analyze", path.to_str().unwrap()]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Transcript analysis"));
    assert!(stdout.contains("duplicates"));
    assert!(stdout.contains("Recommended settings"));
    assert!(stdout.contains("smart-reconstruct"));
}

#[test]
fn analyze_json_output_parses() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.raw");
    fs::write(&path, animated_capture()).unwrap();

    let (stdout, _stderr, code) = run_atc(&["analyze", path.to_str().unwrap(), "--json"]);
    assert_eq!(code, 0);
    let value: serde_json::Value =
        serde_json::from_str(&stdout).expect("JSON report must parse");
    assert!(value["duplicate_line_ratio"].as_f64().unwrap() > 0.5);
    assert!(value["recommendation"]["mode"].is_string());
    assert!(value["frames"]["frame_count"].as_u64().unwrap() > 10);
}

#[test]
fn analyze_empty_capture_succeeds() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.raw");
    fs::write(&path, "").unwrap();

    let (_stdout, _stderr, code) = run_atc(&["analyze", path.to_str().unwrap()]);
    assert_eq!(code, 0);
}
