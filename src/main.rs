//! Agent Transcript Compactor (ATC) - CLI entry point

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use humansize::{format_size, DECIMAL};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use atc::analyzer::PatternAnalyzer;
use atc::cli::{build_cli_styles, Cli, Commands, ConfigCommands};
use atc::config::{CompactConfig, CompactMode};
use atc::screen::{VirtualScreen, DEFAULT_COLS, DEFAULT_ROWS};
use atc::session::CompactSession;

/// Read the raw capture from a file or stdin ('-').
fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read input file: {}", input))
    }
}

fn write_output(output: Option<&PathBuf>, text: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            io::stdout()
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")?;
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_compact(
    input: &str,
    mode: Option<CompactMode>,
    output: Option<PathBuf>,
    min_frame_interval_ms: Option<u64>,
    no_strip_ansi: bool,
    no_normalize_numbers: bool,
) -> Result<()> {
    let mut config = CompactConfig::load().unwrap_or_default();
    if let Some(mode) = mode {
        config.mode = mode;
    }
    if let Some(ms) = min_frame_interval_ms {
        config.min_frame_interval_ms = ms;
    }
    if no_strip_ansi {
        config.strip_ansi = false;
    }
    if no_normalize_numbers {
        config.normalize_numbers = false;
    }

    let raw = read_input(input)?;
    let mut session = CompactSession::new(&config);
    let mut transcript = String::new();
    // Feed in bounded chunks so the carry-over paths behave exactly as they
    // would against a live pseudo-terminal
    let bytes = raw.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        let mut end = (start + 4096).min(bytes.len());
        while end < bytes.len() && !raw.is_char_boundary(end) {
            end += 1;
        }
        transcript.push_str(&session.process_chunk(&raw[start..end]));
        start = end;
    }
    transcript.push_str(&session.flush());

    write_output(output.as_ref(), &transcript)?;

    if output.is_some() {
        eprintln!(
            "Compacted {} -> {} ({} mode)",
            format_size(raw.len(), DECIMAL),
            format_size(transcript.len(), DECIMAL),
            config.mode
        );
    }
    Ok(())
}

fn cmd_screen(input: &str, cols: Option<usize>, rows: Option<usize>) -> Result<()> {
    let (detected_cols, detected_rows) = terminal_size::terminal_size()
        .map(|(w, h)| (w.0 as usize, h.0 as usize))
        .unwrap_or((DEFAULT_COLS, DEFAULT_ROWS));
    let cols = cols.unwrap_or(detected_cols);
    let rows = rows.unwrap_or(detected_rows);

    let raw = read_input(input)?;
    let mut screen = VirtualScreen::new(cols, rows);
    screen.write(&raw);
    println!("{}", screen.snapshot());
    Ok(())
}

fn cmd_analyze(input: &str, json: bool) -> Result<()> {
    let raw = read_input(input)?;
    let report = PatternAnalyzer::default().analyze(&raw);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Transcript analysis ({})", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!();
    println!(
        "  Size:            {} raw, {} visible",
        format_size(report.total_bytes, DECIMAL),
        format_size(report.visible_bytes, DECIMAL)
    );
    println!(
        "  Lines:           {} total, {} unique ({:.0}% duplicates)",
        report.total_lines,
        report.unique_lines,
        report.duplicate_line_ratio * 100.0
    );
    println!(
        "  Animation:       {:.0}% of lines are spinner/status",
        report.animation_density * 100.0
    );
    println!(
        "  Frames:          {} ({}-{} lines, avg {:.1}, {:.0}% consecutive duplicates)",
        report.frames.frame_count,
        report.frames.min_lines,
        report.frames.max_lines,
        report.frames.avg_lines,
        report.frames.duplicate_frame_ratio * 100.0
    );
    println!();
    println!("  Categories:");
    let c = &report.categories;
    for (name, count) in [
        ("status/spinner", c.status_animation),
        ("box drawing", c.box_drawing),
        ("tool invocations", c.tool_invocation),
        ("transient results", c.tool_result_transient),
        ("final results", c.tool_result_final),
        ("command echoes", c.command_echo),
        ("greeting fragments", c.greeting_fragment),
        ("tips", c.tip),
        ("plain content", c.plain_content),
        ("empty", c.empty),
    ] {
        if count > 0 {
            println!("    {:<20} {}", name, count);
        }
    }
    println!();
    println!("  Recommended settings:");
    let r = &report.recommendation;
    println!("    mode                 {}", r.mode);
    println!("    strip_ansi           {}", r.strip_ansi);
    println!("    normalize_numbers    {}", r.normalize_numbers);
    println!("    min_frame_interval   {} ms", r.min_frame_interval_ms);
    println!("    ({})", r.reason);
    Ok(())
}

fn cmd_config(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = CompactConfig::load()?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigCommands::Path => {
            println!("{}", CompactConfig::config_path()?.display());
        }
        ConfigCommands::Init => {
            let config = CompactConfig::default();
            config.save()?;
            println!("Wrote default config to {}", CompactConfig::config_path()?.display());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compact {
            input,
            mode,
            output,
            min_frame_interval_ms,
            no_strip_ansi,
            no_normalize_numbers,
        } => cmd_compact(
            &input,
            mode,
            output,
            min_frame_interval_ms,
            no_strip_ansi,
            no_normalize_numbers,
        ),
        Commands::Screen { input, cols, rows } => cmd_screen(&input, cols, rows),
        Commands::Analyze { input, json } => cmd_analyze(&input, json),
        Commands::Config(command) => cmd_config(command),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command().styles(build_cli_styles());
            clap_complete::generate(shell, &mut cmd, "atc", &mut io::stdout());
            Ok(())
        }
    }
}
