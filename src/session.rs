//! Per-session compaction engine.
//!
//! [`CompactSession`] is the surface the session supervisor talks to: it
//! accepts raw output chunks in arrival order (chunks may split lines or
//! escape sequences anywhere), returns whatever text the active mode
//! emits, and reconciles all buffered state at `flush`. The session does
//! no I/O and shares no state with other sessions; output lines are never
//! reordered relative to the input, only deleted or merged.

use tracing::debug;

use crate::classify::{is_chrome, LineCategory, LineClassifier};
use crate::config::{CompactConfig, CompactMode};
use crate::dedup::FrameDeduplicator;
use crate::escape::visible_line;
use crate::frame::FrameSegmenter;
use crate::reconstruct::SmartReconstructor;
use crate::status::StatusLineBuffer;

pub struct CompactSession {
    mode: CompactMode,
    state: ModeState,
}

enum ModeState {
    Frame {
        segmenter: FrameSegmenter,
        dedup: FrameDeduplicator,
    },
    Aggressive {
        /// Trailing partial line carried between chunks
        carry: String,
        classifier: LineClassifier,
        status: StatusLineBuffer,
        keep_status: bool,
        last_emitted: Option<String>,
        blank_streak: usize,
        emitted_any: bool,
    },
    SmartReconstruct {
        reconstructor: SmartReconstructor,
    },
}

impl CompactSession {
    pub fn new(config: &CompactConfig) -> Self {
        let classifier = LineClassifier::new(config.min_content_length);
        let state = match config.mode {
            CompactMode::Frame => {
                let mut dedup = FrameDeduplicator::new(
                    config.min_frame_interval(),
                    config.max_frame_buffer,
                    classifier,
                );
                if !config.strip_ansi {
                    dedup = dedup.with_raw_output();
                }
                ModeState::Frame {
                    segmenter: FrameSegmenter::new(config.normalize_numbers),
                    dedup,
                }
            }
            CompactMode::Aggressive => ModeState::Aggressive {
                carry: String::new(),
                classifier: LineClassifier::new(config.min_content_length),
                status: StatusLineBuffer::new(classifier),
                keep_status: config.keep_first_and_last_status,
                last_emitted: None,
                blank_streak: 0,
                emitted_any: false,
            },
            CompactMode::SmartReconstruct => ModeState::SmartReconstruct {
                reconstructor: SmartReconstructor::new(classifier),
            },
        };
        debug!(mode = %config.mode, "compact session started");
        Self {
            mode: config.mode,
            state,
        }
    }

    pub fn mode(&self) -> CompactMode {
        self.mode
    }

    /// Feed one raw chunk; returns emitted text, possibly empty.
    ///
    /// Processing is synchronous: the chunk is fully classified and
    /// filtered before this returns.
    pub fn process_chunk(&mut self, chunk: &str) -> String {
        match self.mode {
            CompactMode::Frame => {
                let ModeState::Frame { segmenter, dedup } = &mut self.state else {
                    unreachable!("mode/state mismatch");
                };
                let mut out = String::new();
                for frame in segmenter.push(chunk) {
                    if let Some(text) = dedup.process(frame) {
                        out.push_str(&text);
                    }
                }
                out
            }
            CompactMode::Aggressive => {
                let complete = {
                    let ModeState::Aggressive { carry, .. } = &mut self.state else {
                        unreachable!("mode/state mismatch");
                    };
                    carry.push_str(chunk);
                    match carry.rfind('\n') {
                        Some(pos) => {
                            let done = carry[..=pos].to_string();
                            carry.replace_range(..=pos, "");
                            done
                        }
                        None => String::new(),
                    }
                };
                let mut out = String::new();
                for line in complete.lines() {
                    if let Some(text) = self.aggressive_line(line) {
                        out.push_str(&text);
                        out.push('\n');
                    }
                }
                out
            }
            CompactMode::SmartReconstruct => {
                let ModeState::SmartReconstruct { reconstructor } = &mut self.state else {
                    unreachable!("mode/state mismatch");
                };
                // Capture-only: nothing is emitted until flush
                reconstructor.process_chunk(chunk);
                String::new()
            }
        }
    }

    /// End of session: reconcile all buffered state into final output.
    ///
    /// The supervisor calls this exactly once, at normal termination or
    /// when killing the session early.
    pub fn flush(&mut self) -> String {
        match self.mode {
            CompactMode::Frame => {
                let ModeState::Frame { segmenter, dedup } = &mut self.state else {
                    unreachable!("mode/state mismatch");
                };
                let mut out = String::new();
                if let Some(frame) = segmenter.flush() {
                    if let Some(text) = dedup.process(frame) {
                        out.push_str(&text);
                    }
                }
                if let Some(text) = dedup.flush() {
                    out.push_str(&text);
                }
                out
            }
            CompactMode::Aggressive => {
                let remainder = {
                    let ModeState::Aggressive { carry, .. } = &mut self.state else {
                        unreachable!("mode/state mismatch");
                    };
                    std::mem::take(carry)
                };
                let mut out = String::new();
                if !remainder.is_empty() {
                    if let Some(text) = self.aggressive_line(&remainder) {
                        out.push_str(&text);
                        out.push('\n');
                    }
                }
                let ModeState::Aggressive { status, .. } = &mut self.state else {
                    unreachable!("mode/state mismatch");
                };
                if let Some(text) = status.flush() {
                    out.push_str(&text);
                    out.push('\n');
                }
                out
            }
            CompactMode::SmartReconstruct => {
                let ModeState::SmartReconstruct { reconstructor } = &mut self.state else {
                    unreachable!("mode/state mismatch");
                };
                reconstructor.flush()
            }
        }
    }

    /// Aggressive mode: classify one complete line and decide its fate.
    fn aggressive_line(&mut self, raw_line: &str) -> Option<String> {
        let ModeState::Aggressive {
            classifier,
            status,
            keep_status,
            last_emitted,
            blank_streak,
            emitted_any,
            ..
        } = &mut self.state
        else {
            unreachable!("aggressive_line called outside aggressive mode");
        };

        let visible = visible_line(raw_line);
        let category = classifier.classify(&visible);

        match category {
            LineCategory::Empty => {
                // Single blank line survives between content blocks
                if *blank_streak == 0 && *emitted_any {
                    *blank_streak += 1;
                    return Some(String::new());
                }
                *blank_streak += 1;
                None
            }
            LineCategory::StatusAnimation if classifier.is_status_line(&visible) => {
                if *keep_status {
                    let passed = status.process_line(&visible)?;
                    // Streak resets only on emission so blanks around a
                    // suppressed line still collapse to one
                    *blank_streak = 0;
                    *last_emitted = Some(passed.clone());
                    *emitted_any = true;
                    Some(passed)
                } else {
                    None
                }
            }
            category if is_chrome(category) => None,
            _ => {
                if last_emitted.as_deref() == Some(visible.as_str()) {
                    return None;
                }
                // Route through the status buffer so its final-line
                // bookkeeping stays accurate
                let passed = status.process_line(&visible)?;
                *blank_streak = 0;
                *last_emitted = Some(passed.clone());
                *emitted_any = true;
                Some(passed)
            }
        }
    }
}
