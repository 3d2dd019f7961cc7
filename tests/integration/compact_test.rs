//! End-to-end tests for the compact command.

use std::fs;
use std::process::{Command, Stdio};
use std::io::Write;

use tempfile::TempDir;

/// Helper to run atc and capture output
fn run_atc(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_atc"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute atc");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn write_capture(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write capture file");
    path
}

/// Raw capture with a spinner redraw loop and a final answer.
fn animated_capture() -> String {
    let boundary = "\x1b[2K\x1b[1A";
    let mut raw = String::new();
    for i in 1..=20 {
        raw.push_str(&format!("✻ Baking… ({}s)\n{}", i, boundary));
    }
    raw.push_str("the final answer is 42\n");
    raw
}

#[test]
fn compact_file_to_stdout() {
    let dir = TempDir::new().unwrap();
    let path = write_capture(&dir, "session.raw", &animated_capture());

    let (stdout, _stderr, code) = run_atc(&["compact", path.to_str().unwrap()]);
    assert_eq!(code, 0);
    assert!(stdout.contains("the final answer is 42"));
    // The redraw loop must not survive
    assert!(stdout.matches("Baking").count() <= 2);
}

#[test]
fn compact_smart_reconstruct_mode() {
    let dir = TempDir::new().unwrap();
    let raw = "● Read(file.ts)\n⎿ Waiting…\n⎿ Found 40 lines\n";
    let path = write_capture(&dir, "session.raw", raw);

    let (stdout, _stderr, code) = run_atc(&[
        "compact",
        path.to_str().unwrap(),
        "--mode",
        "smart-reconstruct",
    ]);
    assert_eq!(code, 0);
    assert!(stdout.contains("● Read(file.ts)"));
    assert!(stdout.contains("⎿ Found 40 lines"));
    assert!(!stdout.contains("Waiting"));
}

#[test]
fn compact_to_output_file() {
    let dir = TempDir::new().unwrap();
    let path = write_capture(&dir, "session.raw", &animated_capture());
    let out_path = dir.path().join("session.txt");

    let (_stdout, stderr, code) = run_atc(&[
        "compact",
        path.to_str().unwrap(),
        "-o",
        out_path.to_str().unwrap(),
    ]);
    assert_eq!(code, 0);
    let written = fs::read_to_string(&out_path).expect("output file written");
    assert!(written.contains("the final answer is 42"));
    // Size summary goes to stderr when writing a file
    assert!(stderr.contains("Compacted"));
}

#[test]
fn compact_reads_stdin_with_dash() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_atc"))
        .args(["compact", "-", "--mode", "aggressive"])
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to spawn atc");
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all("✻ Baking… (1s)\n✻ Baking… (2s)\n✻ Baking… (7s)\ndone with everything\n".as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(1s)"));
    assert!(stdout.contains("(7s)"));
    assert!(!stdout.contains("(2s)"));
    assert!(stdout.contains("done with everything"));
}

#[test]
fn compact_missing_file_fails() {
    let (_stdout, stderr, code) = run_atc(&["compact", "/nonexistent/never.raw"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Failed to read input file"));
}

#[test]
fn compact_rejects_unknown_mode() {
    let dir = TempDir::new().unwrap();
    let path = write_capture(&dir, "session.raw", "content\n");
    let (_stdout, _stderr, code) = run_atc(&["compact", path.to_str().unwrap(), "--mode", "bogus"]);
    assert_ne!(code, 0);
}

#[test]
fn compacted_output_is_plain_utf8_text() {
    let dir = TempDir::new().unwrap();
    let path = write_capture(&dir, "session.raw", &animated_capture());
    let (stdout, _stderr, code) = run_atc(&["compact", path.to_str().unwrap()]);
    assert_eq!(code, 0);
    // No escape bytes may survive default compaction
    assert!(!stdout.contains('\x1b'));
}
