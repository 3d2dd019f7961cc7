//! Offline transcript analysis.
//!
//! Scans a captured raw transcript in a single pass and reports what the
//! live filters would have to deal with: duplicate-line ratios, frame
//! boundary counts and sizes, animation density, and a recommended
//! configuration derived from those measurements. Pure reporting - nothing
//! here touches the live pipeline, and nothing here fails hard.

use std::collections::HashMap;

use serde::Serialize;

use crate::classify::{LineCategory, LineClassifier};
use crate::config::{CompactConfig, CompactMode};
use crate::escape::{strip_ansi, visible_line};
use crate::frame::{mask_numbers, FrameSegmenter};

/// Per-category line counts.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CategoryCounts {
    pub status_animation: usize,
    pub box_drawing: usize,
    pub tool_invocation: usize,
    pub tool_result_transient: usize,
    pub tool_result_final: usize,
    pub command_echo: usize,
    pub greeting_fragment: usize,
    pub tip: usize,
    pub plain_content: usize,
    pub empty: usize,
}

/// Frame size distribution over the capture.
#[derive(Debug, Default, Clone, Serialize)]
pub struct FrameStats {
    pub frame_count: usize,
    pub min_lines: usize,
    pub max_lines: usize,
    pub avg_lines: f64,
    /// Fraction of consecutive frame pairs with identical normalized text
    pub duplicate_frame_ratio: f64,
}

/// Recommended filter configuration derived from the measurements.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub mode: CompactMode,
    pub strip_ansi: bool,
    pub normalize_numbers: bool,
    pub min_frame_interval_ms: u64,
    pub reason: String,
}

/// Full report for one analyzed transcript.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptReport {
    pub total_bytes: usize,
    pub visible_bytes: usize,
    pub total_lines: usize,
    pub unique_lines: usize,
    /// Fraction of lines that repeat an earlier line (after number masking)
    pub duplicate_line_ratio: f64,
    /// Fraction of lines that are status/spinner animation
    pub animation_density: f64,
    pub categories: CategoryCounts,
    pub frames: FrameStats,
    pub recommendation: Recommendation,
}

/// Single-pass offline analyzer.
pub struct PatternAnalyzer {
    classifier: LineClassifier,
}

impl PatternAnalyzer {
    pub fn new(classifier: LineClassifier) -> Self {
        Self { classifier }
    }

    /// Analyze one captured transcript.
    pub fn analyze(&self, raw: &str) -> TranscriptReport {
        let stripped = strip_ansi(raw);

        let mut categories = CategoryCounts::default();
        let mut line_counts: HashMap<String, usize> = HashMap::new();
        let mut total_lines = 0usize;
        let mut status_lines = 0usize;

        for raw_line in stripped.lines() {
            total_lines += 1;
            let visible = visible_line(raw_line);
            let masked = mask_numbers(&visible);
            *line_counts.entry(masked).or_insert(0) += 1;

            match self.classifier.classify(&visible) {
                LineCategory::StatusAnimation => {
                    categories.status_animation += 1;
                    status_lines += 1;
                }
                LineCategory::BoxDrawing => categories.box_drawing += 1,
                LineCategory::ToolInvocation => categories.tool_invocation += 1,
                LineCategory::ToolResult(state) => {
                    use crate::classify::ResultState;
                    match state {
                        ResultState::Transient => categories.tool_result_transient += 1,
                        ResultState::Final => categories.tool_result_final += 1,
                    }
                }
                LineCategory::CommandEcho => categories.command_echo += 1,
                LineCategory::GreetingFragment => categories.greeting_fragment += 1,
                LineCategory::Tip => categories.tip += 1,
                LineCategory::PlainContent => categories.plain_content += 1,
                LineCategory::Empty => categories.empty += 1,
            }
        }

        let unique_lines = line_counts.len();
        let duplicate_line_ratio = if total_lines > 0 {
            (total_lines - unique_lines) as f64 / total_lines as f64
        } else {
            0.0
        };
        let animation_density = if total_lines > 0 {
            status_lines as f64 / total_lines as f64
        } else {
            0.0
        };

        let frames = self.measure_frames(raw);
        let recommendation =
            self.recommend(duplicate_line_ratio, animation_density, &frames, raw, &stripped);

        TranscriptReport {
            total_bytes: raw.len(),
            visible_bytes: stripped.len(),
            total_lines,
            unique_lines,
            duplicate_line_ratio,
            animation_density,
            categories,
            frames,
            recommendation,
        }
    }

    fn measure_frames(&self, raw: &str) -> FrameStats {
        let mut segmenter = FrameSegmenter::new(true);
        let mut frames = segmenter.push(raw);
        if let Some(last) = segmenter.flush() {
            frames.push(last);
        }

        if frames.is_empty() {
            return FrameStats::default();
        }

        let line_counts: Vec<usize> = frames.iter().map(|f| f.line_count).collect();
        let min_lines = line_counts.iter().copied().min().unwrap_or(0);
        let max_lines = line_counts.iter().copied().max().unwrap_or(0);
        let avg_lines = line_counts.iter().sum::<usize>() as f64 / line_counts.len() as f64;

        let duplicate_pairs = frames
            .windows(2)
            .filter(|pair| pair[0].hash == pair[1].hash)
            .count();
        let duplicate_frame_ratio = if frames.len() > 1 {
            duplicate_pairs as f64 / (frames.len() - 1) as f64
        } else {
            0.0
        };

        FrameStats {
            frame_count: frames.len(),
            min_lines,
            max_lines,
            avg_lines,
            duplicate_frame_ratio,
        }
    }

    fn recommend(
        &self,
        duplicate_line_ratio: f64,
        animation_density: f64,
        frames: &FrameStats,
        raw: &str,
        stripped: &str,
    ) -> Recommendation {
        let escape_overhead = if raw.is_empty() {
            0.0
        } else {
            raw.len().saturating_sub(stripped.len()) as f64 / raw.len() as f64
        };
        let strip = escape_overhead > 0.02;

        let (mode, reason) = if duplicate_line_ratio > 0.5 || animation_density > 0.3 {
            (
                CompactMode::SmartReconstruct,
                format!(
                    "heavy animation ({:.0}% duplicate lines, {:.0}% status lines); \
                     full reconstruction recovers the settled transcript",
                    duplicate_line_ratio * 100.0,
                    animation_density * 100.0
                ),
            )
        } else if frames.frame_count > 3 && frames.duplicate_frame_ratio > 0.2 {
            (
                CompactMode::Frame,
                format!(
                    "{} frames with {:.0}% consecutive duplicates; frame dedup suffices",
                    frames.frame_count,
                    frames.duplicate_frame_ratio * 100.0
                ),
            )
        } else {
            (
                CompactMode::Aggressive,
                "low redraw activity; line-level chrome filtering is enough".to_string(),
            )
        };

        let min_frame_interval_ms = if animation_density > 0.3 { 1000 } else { 500 };

        Recommendation {
            mode,
            strip_ansi: strip,
            normalize_numbers: duplicate_line_ratio > 0.1,
            min_frame_interval_ms,
            reason,
        }
    }

    /// Build a full config from a report's recommendation.
    pub fn recommended_config(report: &TranscriptReport) -> CompactConfig {
        CompactConfig {
            mode: report.recommendation.mode,
            strip_ansi: report.recommendation.strip_ansi,
            normalize_numbers: report.recommendation.normalize_numbers,
            min_frame_interval_ms: report.recommendation.min_frame_interval_ms,
            ..CompactConfig::default()
        }
    }
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new(LineClassifier::default())
    }
}
