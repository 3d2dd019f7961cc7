//! Configuration management for ATC

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CompactError;

/// Operating mode for a capture session. Fixed for the session lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CompactMode {
    /// Segment into redraw frames and deduplicate whole frames
    Frame,
    /// Per-line chrome filtering with first/last status retention
    Aggressive,
    /// Capture everything, reconstruct the settled transcript at flush
    SmartReconstruct,
}

impl Default for CompactMode {
    fn default() -> Self {
        CompactMode::Frame
    }
}

impl FromStr for CompactMode {
    type Err = CompactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frame" => Ok(CompactMode::Frame),
            "aggressive" => Ok(CompactMode::Aggressive),
            "smart-reconstruct" => Ok(CompactMode::SmartReconstruct),
            other => Err(CompactError::UnknownMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for CompactMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CompactMode::Frame => "frame",
            CompactMode::Aggressive => "aggressive",
            CompactMode::SmartReconstruct => "smart-reconstruct",
        };
        write!(f, "{}", name)
    }
}

/// Per-session compaction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactConfig {
    #[serde(default)]
    pub mode: CompactMode,
    /// Minimum time between emitted frames
    #[serde(default = "default_min_frame_interval_ms")]
    pub min_frame_interval_ms: u64,
    /// Pending frame buffer capacity before force-emit
    #[serde(default = "default_max_frame_buffer")]
    pub max_frame_buffer: usize,
    #[serde(default = "default_true")]
    pub strip_ansi: bool,
    /// Mask digit runs before comparing frames/lines
    #[serde(default = "default_true")]
    pub normalize_numbers: bool,
    /// Retain the first and final occurrence of a spinner status line
    #[serde(default = "default_true")]
    pub keep_first_and_last_status: bool,
    /// Visible width below which a line is treated as redraw debris
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,
    #[serde(default = "default_screen_cols")]
    pub screen_cols: usize,
    #[serde(default = "default_screen_rows")]
    pub screen_rows: usize,
}

fn default_min_frame_interval_ms() -> u64 {
    1000
}

fn default_max_frame_buffer() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_min_content_length() -> usize {
    5
}

fn default_screen_cols() -> usize {
    crate::screen::DEFAULT_COLS
}

fn default_screen_rows() -> usize {
    crate::screen::DEFAULT_ROWS
}

impl Default for CompactConfig {
    fn default() -> Self {
        Self {
            mode: CompactMode::default(),
            min_frame_interval_ms: default_min_frame_interval_ms(),
            max_frame_buffer: default_max_frame_buffer(),
            strip_ansi: default_true(),
            normalize_numbers: default_true(),
            keep_first_and_last_status: default_true(),
            min_content_length: default_min_content_length(),
            screen_cols: default_screen_cols(),
            screen_rows: default_screen_rows(),
        }
    }
}

impl CompactConfig {
    /// Path to the config file (~/.config/atc/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("atc").join("config.toml"))
    }

    /// Load configuration from disk, falling back to defaults when no file
    /// exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn min_frame_interval(&self) -> Duration {
        Duration::from_millis(self.min_frame_interval_ms)
    }
}
