//! First-and-last retention for spinner status lines.
//!
//! A long-running spinner repaints the same status line hundreds of times
//! with only its counters advancing. Keeping the first and the final
//! occurrence tells the reader both that the phase started and how it
//! ended, at the cost of two lines instead of hundreds.

use crate::classify::LineClassifier;

pub struct StatusLineBuffer {
    classifier: LineClassifier,
    /// First status line that was passed through
    first_emitted: Option<String>,
    /// Most recent status line observed, emitted or not
    last_seen: Option<String>,
    /// Last line of any kind this buffer emitted
    last_output: Option<String>,
}

impl StatusLineBuffer {
    pub fn new(classifier: LineClassifier) -> Self {
        Self {
            classifier,
            first_emitted: None,
            last_seen: None,
            last_output: None,
        }
    }

    /// Process one line. Non-status lines pass through untouched; status
    /// lines pass through only on first occurrence.
    pub fn process_line(&mut self, line: &str) -> Option<String> {
        if !self.classifier.is_status_line(line.trim()) {
            self.last_output = Some(line.to_string());
            return Some(line.to_string());
        }

        self.last_seen = Some(line.to_string());
        if self.first_emitted.is_none() {
            self.first_emitted = Some(line.to_string());
            self.last_output = Some(line.to_string());
            return Some(line.to_string());
        }
        None
    }

    /// End of batch: re-append the final status line if it was suppressed
    /// and is not already the last thing we emitted.
    pub fn flush(&mut self) -> Option<String> {
        let last = self.last_seen.take()?;
        let already_emitted = self.first_emitted.as_deref() == Some(last.as_str());
        let is_final_output = self.last_output.as_deref() == Some(last.as_str());
        self.first_emitted = None;
        if already_emitted || is_final_output {
            return None;
        }
        self.last_output = Some(last.clone());
        Some(last)
    }
}

impl Default for StatusLineBuffer {
    fn default() -> Self {
        Self::new(LineClassifier::default())
    }
}
