//! Frame deduplication state machine.
//!
//! Decides, for each captured frame, whether it carries enough new
//! information to emit. Exact duplicates (after number masking) are always
//! dropped; frames arriving faster than the minimum interval are parked in
//! a bounded pending buffer so a fast redraw loop cannot starve emission.
//!
//! Nothing in here can fail: content we cannot compare is treated as
//! significant and emitted, preferring residual noise over silent loss.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::classify::LineClassifier;
use crate::frame::Frame;

/// Line-count delta above which a frame is always significant.
const SIGNIFICANT_LINE_DELTA: usize = 5;

/// Fraction of differing aligned lines above which a frame is significant.
const SIGNIFICANT_CHANGE_RATIO: f64 = 0.20;

/// What the deduplicator remembers about the last frame it let through.
struct EmittedFrame {
    hash: u64,
    normalized_lines: Vec<String>,
    line_count: usize,
    emitted_at: Instant,
}

pub struct FrameDeduplicator {
    last: Option<EmittedFrame>,
    pending: Vec<Frame>,
    max_pending: usize,
    min_interval: Duration,
    classifier: LineClassifier,
    /// Emit stripped text (true) or the raw capture (false)
    strip_ansi: bool,
    emitted_count: usize,
    discarded_count: usize,
}

impl FrameDeduplicator {
    pub fn new(min_interval: Duration, max_pending: usize, classifier: LineClassifier) -> Self {
        Self {
            last: None,
            pending: Vec::new(),
            max_pending,
            min_interval,
            classifier,
            strip_ansi: true,
            emitted_count: 0,
            discarded_count: 0,
        }
    }

    /// Keep escape sequences in emitted frames instead of stripping them.
    pub fn with_raw_output(mut self) -> Self {
        self.strip_ansi = false;
        self
    }

    /// Process one frame; returns formatted text when the frame is emitted.
    pub fn process(&mut self, frame: Frame) -> Option<String> {
        let Some(last) = &self.last else {
            // First frame ever is always emitted
            return Some(self.emit(frame));
        };

        if frame.hash == last.hash {
            self.discarded_count += 1;
            debug!(hash = frame.hash, "frame discarded: exact duplicate");
            return None;
        }

        if last.emitted_at.elapsed() < self.min_interval {
            self.pending.push(frame);
            if self.pending.len() >= self.max_pending {
                // Buffer full: force-emit the newest so output cannot starve
                let newest = self.pending.pop().expect("buffer is at capacity");
                self.discarded_count += self.pending.len();
                self.pending.clear();
                debug!("pending buffer full, force-emitting newest frame");
                return Some(self.emit(newest));
            }
            return None;
        }

        if self.is_significant(last, &frame) {
            self.discarded_count += self.pending.len();
            self.pending.clear();
            Some(self.emit(frame))
        } else {
            // Parked frames are older than the one being discarded; a later
            // flush must not resurface them as the stream's final state
            self.discarded_count += 1 + self.pending.len();
            self.pending.clear();
            debug!(hash = frame.hash, "frame discarded: insignificant change");
            None
        }
    }

    /// End of stream: reconcile the pending buffer so the final state of a
    /// fast redraw loop is not lost.
    pub fn flush(&mut self) -> Option<String> {
        let newest = self.pending.pop()?;
        self.discarded_count += self.pending.len();
        self.pending.clear();
        let duplicate = self
            .last
            .as_ref()
            .map(|l| l.hash == newest.hash)
            .unwrap_or(false);
        if duplicate {
            self.discarded_count += 1;
            None
        } else {
            Some(self.emit(newest))
        }
    }

    pub fn emitted_count(&self) -> usize {
        self.emitted_count
    }

    pub fn discarded_count(&self) -> usize {
        self.discarded_count
    }

    /// Significant change: large line-count delta, or enough aligned lines
    /// differing after number masking.
    fn is_significant(&self, last: &EmittedFrame, frame: &Frame) -> bool {
        let delta = frame.line_count.abs_diff(last.line_count);
        if delta > SIGNIFICANT_LINE_DELTA {
            return true;
        }
        let new_lines = frame.normalized_lines();
        let total = new_lines.len().max(last.normalized_lines.len());
        if total == 0 {
            // Nothing to compare: conservatively significant
            return true;
        }
        let aligned_diff = new_lines
            .iter()
            .zip(last.normalized_lines.iter())
            .filter(|(a, b)| **a != b.as_str())
            .count();
        let differing = aligned_diff + new_lines.len().abs_diff(last.normalized_lines.len());
        differing as f64 / total as f64 > SIGNIFICANT_CHANGE_RATIO
    }

    fn emit(&mut self, frame: Frame) -> String {
        let text = self.format_frame(&frame);
        self.last = Some(EmittedFrame {
            hash: frame.hash,
            normalized_lines: frame.normalized.lines().map(String::from).collect(),
            line_count: frame.line_count,
            emitted_at: Instant::now(),
        });
        self.emitted_count += 1;
        debug!(lines = frame.line_count, "frame emitted");
        text
    }

    /// Collapse status lines to first+last and drop exact duplicate lines,
    /// preserving first-occurrence order.
    fn format_frame(&self, frame: &Frame) -> String {
        let text = if self.strip_ansi {
            &frame.stripped
        } else {
            &frame.raw
        };
        let lines: Vec<&str> = text.lines().collect();

        let status_indices: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| self.classifier.is_status_line(l.trim()))
            .map(|(i, _)| i)
            .collect();
        let first_status = status_indices.first().copied();
        let last_status = status_indices.last().copied();

        let mut seen = HashSet::new();
        let mut out = String::new();
        for (i, line) in lines.iter().enumerate() {
            if status_indices.contains(&i)
                && Some(i) != first_status
                && Some(i) != last_status
            {
                continue;
            }
            if !line.trim().is_empty() && !seen.insert(*line) {
                continue;
            }
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}
