//! Cross-module behavioral properties of the compaction engine.

use atc::config::{CompactConfig, CompactMode};
use atc::escape::strip_ansi;
use atc::session::CompactSession;
use atc::status::StatusLineBuffer;
use atc::screen::VirtualScreen;

use crate::helpers::{
    greeting_banner, spinner, spinner_redraw_loop, tool_call_with_transients, FRAME_BOUNDARY,
};

fn run_session(mode: CompactMode, chunks: &[&str]) -> String {
    let config = CompactConfig {
        mode,
        ..CompactConfig::default()
    };
    let mut session = CompactSession::new(&config);
    let mut out = String::new();
    for chunk in chunks {
        out.push_str(&session.process_chunk(chunk));
    }
    out.push_str(&session.flush());
    out
}

#[test]
fn stripping_twice_equals_stripping_once() {
    let inputs = [
        "\x1b[2K\x1b[1A\x1b[38;5;174mtext\x1b[0m",
        "plain with no sequences",
        "\x1b]0;title\x07body\x1b[?25l",
        "✻ Baking… (3s)\x1b[K",
    ];
    for input in inputs {
        let once = strip_ansi(input);
        assert_eq!(strip_ansi(&once), once, "not idempotent for {:?}", input);
    }
}

#[test]
fn emitted_content_order_matches_input_order() {
    let input = format!(
        "{}> add a feature\n{}step one done here\n{}step two done here\n",
        greeting_banner(),
        spinner_redraw_loop(5),
        spinner_redraw_loop(3),
    );
    for mode in [CompactMode::Aggressive, CompactMode::SmartReconstruct] {
        let out = run_session(mode, &[&input]);
        let cmd = out.find("> add a feature").expect("command echo kept");
        let one = out.find("step one done here").expect("step one kept");
        let two = out.find("step two done here").expect("step two kept");
        assert!(cmd < one && one < two, "order broken in {:?} mode", mode);
    }
}

#[test]
fn identical_frame_fed_n_times_emits_once() {
    let frame: String = (0..12).map(|i| format!("row number {} here\n", i)).collect();
    let mut input = String::new();
    for _ in 0..6 {
        input.push_str(&frame);
        input.push_str(FRAME_BOUNDARY);
    }
    let out = run_session(CompactMode::Frame, &[&input]);
    assert_eq!(out.matches("row number 0 here").count(), 1);
}

#[test]
fn status_line_first_and_final_value_retained() {
    let mut buf = StatusLineBuffer::default();
    let mut out = Vec::new();
    for i in [3, 4, 5] {
        if let Some(line) = buf.process_line(&spinner(i)) {
            out.push(line);
        }
    }
    if let Some(line) = buf.flush() {
        out.push(line);
    }
    assert_eq!(out, vec![spinner(3), spinner(5)]);
}

#[test]
fn status_line_seen_once_emitted_exactly_once() {
    let mut buf = StatusLineBuffer::default();
    let mut emitted = 0;
    if buf.process_line(&spinner(7)).is_some() {
        emitted += 1;
    }
    if buf.flush().is_some() {
        emitted += 1;
    }
    assert_eq!(emitted, 1);
}

#[test]
fn greeting_survives_arbitrary_chunking() {
    let input = format!("{}hello from the model\n", greeting_banner());
    let whole = run_session(CompactMode::SmartReconstruct, &[&input]);

    // Re-run with every chunk size from 1 to 7 bytes (char-aligned)
    for size in 1..=7 {
        let chars: Vec<char> = input.chars().collect();
        let chunks: Vec<String> = chars
            .chunks(size)
            .map(|c| c.iter().collect::<String>())
            .collect();
        let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let out = run_session(CompactMode::SmartReconstruct, &refs);
        assert_eq!(out, whole, "chunk size {} changed the output", size);
    }

    // And the banner is one contiguous block
    let start = whole.find('╭').expect("banner start");
    let end = whole.find('╰').expect("banner end");
    let banner_region = &whole[start..end];
    assert!(
        !banner_region.contains("hello from the model"),
        "banner interleaved with content"
    );
}

#[test]
fn virtual_screens_converge_on_same_script() {
    let script = format!(
        "{}\r\n{}{}\r\n{}{}\r\ndone\r\n",
        spinner(1),
        FRAME_BOUNDARY,
        spinner(2),
        FRAME_BOUNDARY,
        spinner(3)
    );
    let mut a = VirtualScreen::new(120, 40);
    let mut b = VirtualScreen::new(120, 40);
    a.write(&script);
    for chunk in script.chars().collect::<Vec<_>>().chunks(2) {
        b.write(&chunk.iter().collect::<String>());
    }
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn transient_tool_result_suppressed() {
    let out = run_session(CompactMode::SmartReconstruct, &[&tool_call_with_transients()]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines, vec!["● Read(src/main.rs)", "⎿ Found 40 lines"]);
}

#[test]
fn three_empty_lines_collapse_to_one() {
    let out = run_session(
        CompactMode::SmartReconstruct,
        &["real first line\n\n\n\nreal second line\n"],
    );
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines, vec!["real first line", "", "real second line"]);
}

#[test]
fn compaction_shrinks_animated_capture() {
    let input = format!("{}{}", spinner_redraw_loop(50), "final answer text\n");
    for mode in [
        CompactMode::Frame,
        CompactMode::Aggressive,
        CompactMode::SmartReconstruct,
    ] {
        let out = run_session(mode, &[&input]);
        assert!(
            out.len() < input.len() / 4,
            "{:?} mode only shrank {} -> {}",
            mode,
            input.len(),
            out.len()
        );
    }
}
