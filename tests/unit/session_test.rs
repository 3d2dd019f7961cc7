//! Session-level tests: realistic captures through each mode.

use atc::config::{CompactConfig, CompactMode};
use atc::session::CompactSession;

use crate::helpers::{greeting_banner, spinner_redraw_loop, FRAME_BOUNDARY};

/// A capture resembling a short real agent session: greeting, command,
/// animated tool call, result, closing summary.
fn realistic_capture() -> String {
    format!(
        "{greeting}\
> fix the flaky test\n\
{spin1}\
● Bash(cargo test)\n\
⎿ Running…\n\
{spin2}\
● Bash(cargo test)\n\
⎿ 42 tests passed\n\
\n\
The flaky test was caused by an unseeded RNG. I pinned the seed.\n",
        greeting = greeting_banner(),
        spin1 = spinner_redraw_loop(4),
        spin2 = spinner_redraw_loop(3),
    )
}

fn run(mode: CompactMode, input: &str) -> String {
    let config = CompactConfig {
        mode,
        ..CompactConfig::default()
    };
    let mut session = CompactSession::new(&config);
    let mut out = session.process_chunk(input);
    out.push_str(&session.flush());
    out
}

#[test]
fn smart_mode_produces_clean_transcript() {
    let out = run(CompactMode::SmartReconstruct, &realistic_capture());

    assert!(out.contains("Welcome to the Agent CLI"));
    assert!(out.contains("> fix the flaky test"));
    assert_eq!(out.matches("● Bash(cargo test)").count(), 1);
    assert!(out.contains("⎿ 42 tests passed"));
    assert!(!out.contains("Running…"));
    assert!(out.contains("unseeded RNG"));
    // The animated spinner must not survive as repeated lines
    assert!(out.matches("Baking").count() <= 2);
}

#[test]
fn aggressive_mode_keeps_command_and_results() {
    let out = run(CompactMode::Aggressive, &realistic_capture());
    assert!(out.contains("> fix the flaky test"));
    assert!(out.contains("⎿ 42 tests passed"));
    assert!(out.contains("unseeded RNG"));
}

#[test]
fn frame_mode_collapses_redraw_loop() {
    let input = format!("{}all finished now\n", spinner_redraw_loop(30));
    let out = run(CompactMode::Frame, &input);
    // Thirty repaints of the same masked frame collapse to one
    assert_eq!(out.matches("Baking").count(), 1);
    assert!(out.contains("all finished now"));
}

#[test]
fn flush_is_safe_on_empty_session() {
    for mode in [
        CompactMode::Frame,
        CompactMode::Aggressive,
        CompactMode::SmartReconstruct,
    ] {
        let config = CompactConfig {
            mode,
            ..CompactConfig::default()
        };
        let mut session = CompactSession::new(&config);
        assert_eq!(session.flush(), "", "{:?} flush on empty input", mode);
    }
}

#[test]
fn sessions_are_independent() {
    let config = CompactConfig {
        mode: CompactMode::Aggressive,
        ..CompactConfig::default()
    };
    let mut a = CompactSession::new(&config);
    let mut b = CompactSession::new(&config);

    a.process_chunk("✻ Baking… (1s)\n");
    // Session b never saw a status line; its buffer must be empty
    let out_b = b.process_chunk("plain line for b\n");
    assert!(out_b.contains("plain line for b"));
    assert_eq!(b.flush(), "");

    let mut out_a = String::new();
    out_a.push_str(&a.process_chunk("✻ Baking… (9s)\n"));
    out_a.push_str(&a.flush());
    assert!(out_a.contains("(9s)"));
}

#[test]
fn boundary_split_mid_sequence_between_chunks() {
    let config = CompactConfig {
        mode: CompactMode::Frame,
        ..CompactConfig::default()
    };
    let mut session = CompactSession::new(&config);
    let mut out = String::new();
    // Split the boundary escape sequence across two chunks
    let (head, tail) = FRAME_BOUNDARY.split_at(4);
    out.push_str(&session.process_chunk(&format!("frame one text\n{}", head)));
    out.push_str(&session.process_chunk(&format!("{}frame two text\n", tail)));
    out.push_str(&session.flush());
    assert!(out.contains("frame one text"));
    assert!(out.contains("frame two text"));
}
