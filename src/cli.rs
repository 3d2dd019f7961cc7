//! CLI definitions for ATC
//!
//! This module contains the clap CLI structure definitions, separated from
//! main.rs so the command surface can be inspected without pulling in the
//! dispatch logic.

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use clap_complete::Shell as CompletionShell;
use std::path::PathBuf;

use crate::config::CompactMode;

/// Build clap styles using our theme colors.
///
/// - Green: headers, usage, command names (accent color)
/// - White: descriptions, placeholders (renders as light gray on dark terminals)
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "atc", styles = build_cli_styles())]
#[command(about = "[ Agent Transcript Compactor ] - turn animated agent terminal output into readable transcripts")]
#[command(
    long_about = "Agent Transcript Compactor (ATC) - Compact raw AI agent terminal output.

Interactive agent CLIs (Claude, Codex, Gemini, ...) repaint spinners, counters
and status banners dozens of times per second. Logging that stream raw gives
you output 5-20x larger than the meaningful content. ATC collapses redraw
cycles, drops chrome, and keeps exactly the lines that carry information.

QUICK START:
    atc compact session.raw            Compact a captured session
    some-agent | atc compact -         Compact from a pipe
    atc screen session.raw             Show the final rendered screen
    atc analyze session.raw            Measure duplication, get tuning advice

For more information, see: https://github.com/simon/agent-transcript-compactor"
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compact a raw capture into a readable transcript
    #[command(long_about = "Compact a raw terminal capture into a readable transcript.

Reads the raw byte stream of an agent session (a file, or stdin with '-'),
runs it through the selected compaction mode, and writes the transcript to
stdout or --output.

MODES:
    frame              Collapse repeated redraw frames (default)
    aggressive         Per-line chrome filtering, keeps first/last spinner state
    smart-reconstruct  Buffer everything, reconstruct the settled transcript

EXAMPLES:
    atc compact session.raw
    atc compact session.raw --mode smart-reconstruct -o session.txt
    some-agent 2>&1 | atc compact - --mode aggressive")]
    Compact {
        /// Input capture file, or '-' for stdin
        input: String,
        /// Compaction mode
        #[arg(long, short, value_enum)]
        mode: Option<CompactMode>,
        /// Write the transcript here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Minimum milliseconds between emitted frames
        #[arg(long)]
        min_frame_interval_ms: Option<u64>,
        /// Keep escape sequences in emitted text
        #[arg(long)]
        no_strip_ansi: bool,
        /// Compare frames without masking digit runs
        #[arg(long)]
        no_normalize_numbers: bool,
    },

    /// Render the final screen state of a capture
    #[command(long_about = "Replay a capture against a virtual screen and print the final state.

This shows what a human watching the terminal would have seen at the end of
the session, no matter how many redraws happened in between.

EXAMPLES:
    atc screen session.raw
    atc screen session.raw --cols 120 --rows 40")]
    Screen {
        /// Input capture file, or '-' for stdin
        input: String,
        /// Screen width in columns (defaults to the current terminal, else 160)
        #[arg(long)]
        cols: Option<usize>,
        /// Screen height in rows (defaults to the current terminal, else 50)
        #[arg(long)]
        rows: Option<usize>,
    },

    /// Analyze a capture and report duplication statistics
    #[command(long_about = "Scan a capture and report what the live filters would face.

Measures duplicate-line ratio, frame boundaries and sizes, animation density,
and prints a recommended configuration for the compact command.

EXAMPLES:
    atc analyze session.raw
    atc analyze session.raw --json")]
    Analyze {
        /// Input capture file, or '-' for stdin
        input: String,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Print the config file path
    Path,
    /// Write the default configuration to disk
    Init,
}
