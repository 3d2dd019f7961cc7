//! Frame capture: grouping raw output into redraw cycles.
//!
//! Agent CLIs animate their status region by erasing lines and moving the
//! cursor back up, then repainting. One repaint - the span between two
//! successive clear+cursor-up boundary runs - is a frame. Frames are the
//! unit the deduplicator compares and emits.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Instant;

use regex::Regex;

use crate::escape::strip_ansi;

/// Number of buffered lines after which a boundary-free run is
/// force-segmented into one frame.
pub const FORCE_SEGMENT_LINES: usize = 10;

/// One captured redraw cycle. Immutable once created.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Text exactly as captured, control sequences included
    pub raw: String,
    /// Raw text with control sequences removed
    pub stripped: String,
    /// Stripped text with digit runs masked, used for comparison
    pub normalized: String,
    /// Stable digest of the normalized text
    pub hash: u64,
    /// When the frame was segmented out of the stream
    pub captured_at: Instant,
    /// Lines in the stripped text
    pub line_count: usize,
}

impl Frame {
    /// Build a frame from captured raw text.
    pub fn new(raw: String, normalize_numbers: bool) -> Self {
        let stripped = strip_ansi(&raw);
        let normalized = if normalize_numbers {
            mask_numbers(&stripped)
        } else {
            stripped.clone()
        };
        let mut hasher = DefaultHasher::new();
        normalized.hash(&mut hasher);
        let line_count = stripped.lines().count();
        Self {
            raw,
            stripped,
            normalized,
            hash: hasher.finish(),
            captured_at: Instant::now(),
            line_count,
        }
    }

    /// Normalized lines, for aligned comparison against another frame.
    pub fn normalized_lines(&self) -> Vec<&str> {
        self.normalized.lines().collect()
    }
}

/// Replace every digit run with a placeholder so that counters ("3s",
/// "120 tokens") do not defeat duplicate detection.
pub fn mask_numbers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_digits = false;
    for c in text.chars() {
        if c.is_ascii_digit() {
            if !in_digits {
                out.push('#');
                in_digits = true;
            }
        } else {
            in_digits = false;
            out.push(c);
        }
    }
    out
}

/// Splits the running byte stream into frames at clear+cursor-up boundaries.
///
/// Chunk boundaries are arbitrary, so unconsumed trailing text (including a
/// possibly split boundary sequence) is retained for the next call.
pub struct FrameSegmenter {
    carry: String,
    normalize_numbers: bool,
    boundary: Regex,
}

impl FrameSegmenter {
    pub fn new(normalize_numbers: bool) -> Self {
        Self {
            carry: String::new(),
            normalize_numbers,
            // One or more clear-line + cursor-up pairs, in either order,
            // optionally separated by a carriage return
            boundary: Regex::new(r"(?:\x1b\[[0-2]?K\r?\x1b\[\d*A|\x1b\[\d*A\r?\x1b\[[0-2]?K)+")
                .unwrap(),
        }
    }

    /// Feed one chunk; returns every complete frame it closed.
    pub fn push(&mut self, chunk: &str) -> Vec<Frame> {
        self.carry.push_str(chunk);
        let mut frames = Vec::new();

        loop {
            let Some(m) = self.boundary.find(&self.carry) else {
                break;
            };
            let segment = self.carry[..m.start()].to_string();
            self.carry.replace_range(..m.end(), "");
            if !segment.trim().is_empty() {
                frames.push(Frame::new(segment, self.normalize_numbers));
            }
        }

        // Bound memory and staleness when no boundary ever shows up
        if frames.is_empty() && self.carry.lines().count() >= FORCE_SEGMENT_LINES {
            let segment = std::mem::take(&mut self.carry);
            frames.push(Frame::new(segment, self.normalize_numbers));
        }

        frames
    }

    /// End of stream: whatever is buffered becomes the last frame.
    pub fn flush(&mut self) -> Option<Frame> {
        let rest = std::mem::take(&mut self.carry);
        if rest.trim().is_empty() {
            None
        } else {
            Some(Frame::new(rest, self.normalize_numbers))
        }
    }
}
