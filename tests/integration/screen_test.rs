//! End-to-end tests for the screen command.

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

#[test]
fn screen_shows_final_state_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.raw");
    // Three repaints of the same line; only the last should be visible
    fs::write(
        &path,
        "✻ Baking… (1s)\r\n\x1b[1A\x1b[2K✻ Baking… (2s)\r\n\x1b[1A\x1b[2K✻ Baking… (9s)\r\n",
    )
    .unwrap();

    let (stdout, _stderr, code) = run_atc(&[
        "screen",
        path.to_str().unwrap(),
        "--cols",
        "80",
        "--rows",
        "24",
    ]);
    assert_eq!(code, 0);
    assert!(stdout.contains("(9s)"));
    assert!(!stdout.contains("(1s)"));
    assert!(!stdout.contains("(2s)"));
}

#[test]
fn screen_respects_dimensions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.raw");
    fs::write(&path, "1234567890ABC").unwrap();

    let (stdout, _stderr, code) = run_atc(&[
        "screen",
        path.to_str().unwrap(),
        "--cols",
        "10",
        "--rows",
        "5",
    ]);
    assert_eq!(code, 0);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "1234567890");
    assert_eq!(lines[1], "ABC");
}

#[test]
fn screen_zero_dimensions_do_not_crash() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.raw");
    fs::write(&path, "some output\r\nmore output\r\n").unwrap();

    let (_stdout, _stderr, code) = run_atc(&[
        "screen",
        path.to_str().unwrap(),
        "--cols",
        "0",
        "--rows",
        "0",
    ]);
    assert_eq!(code, 0);
}

#[test]
fn screen_missing_file_fails() {
    let (_stdout, stderr, code) = run_atc(&["screen", "/nonexistent/never.raw"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Failed to read input file"));
}
