//! Smart transcript reconstruction.
//!
//! A per-line state machine that turns the animated, redraw-heavy raw
//! stream into the transcript a human would have read: the greeting banner
//! once and intact, each tool invocation once, each tool result only in its
//! final state, chrome gone, duplicates collapsed.
//!
//! The reconstructor runs in capture-only mode: raw input is buffered as it
//! arrives and the state machine runs once over the whole capture at
//! flush. Animations that only settle on their final form after several
//! redraws are therefore always seen settled.

use tracing::debug;

use crate::classify::{is_chrome, LineCategory, LineClassifier, ResultState};
use crate::escape::visible_line;

pub struct SmartReconstructor {
    classifier: LineClassifier,
    captured: String,
    state: ReconstructState,
}

/// Mutable single-owner filter state, reset per session.
#[derive(Default)]
struct ReconstructState {
    in_greeting: bool,
    greeting_buf: Vec<String>,
    greeting_done: bool,
    /// Set after a `cwd:` line; the next blank line closes the banner
    cwd_seen: bool,
    current_tool: Option<String>,
    tool_executing: bool,
    last_emitted: Option<String>,
    blank_streak: usize,
}

impl SmartReconstructor {
    pub fn new(classifier: LineClassifier) -> Self {
        Self {
            classifier,
            captured: String::new(),
            state: ReconstructState::default(),
        }
    }

    /// Buffer one raw chunk. Nothing is emitted until [`flush`].
    ///
    /// [`flush`]: SmartReconstructor::flush
    pub fn process_chunk(&mut self, chunk: &str) {
        self.captured.push_str(chunk);
    }

    /// Run the reconstruction over everything captured so far and return
    /// the filtered transcript. Resets the capture buffer.
    pub fn flush(&mut self) -> String {
        let captured = std::mem::take(&mut self.captured);
        let mut out: Vec<String> = Vec::new();

        for raw_line in captured.lines() {
            self.process_line(raw_line, &mut out);
        }

        // A banner missing its terminator still gets emitted whole
        if self.state.in_greeting {
            debug!("greeting banner unterminated at flush, emitting as-is");
            self.close_greeting(&mut out);
        }

        let mut text = out.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }

    fn process_line(&mut self, raw_line: &str, out: &mut Vec<String>) {
        let visible = visible_line(raw_line);

        if self.state.in_greeting {
            self.buffer_greeting_line(&visible, out);
            return;
        }

        let category = self.classifier.classify(&visible);

        if category == LineCategory::Empty {
            // At most one consecutive blank line survives
            if self.state.blank_streak == 0 && !out.is_empty() {
                out.push(String::new());
            }
            self.state.blank_streak += 1;
            return;
        }

        // Greeting start: opening border glyph or recognized banner text.
        // Pure border lines classify as BoxDrawing, so the glyph is checked
        // directly rather than through the category.
        if !self.state.greeting_done
            && (self.classifier.is_greeting_start(&visible)
                || category == LineCategory::GreetingFragment)
        {
            self.state.in_greeting = true;
            self.buffer_greeting_line(&visible, out);
            return;
        }

        match category {
            LineCategory::ToolInvocation => {
                let name = self.classifier.tool_name(&visible).map(String::from);
                if name.is_some() && name == self.state.current_tool {
                    // Redraw of the spinner frame for the running tool
                    return;
                }
                self.state.current_tool = name;
                self.state.tool_executing = true;
                self.emit(visible, out);
            }
            LineCategory::ToolResult(ResultState::Transient) => {
                // Outcome still pending; the final form will follow
            }
            LineCategory::ToolResult(ResultState::Final) => {
                self.state.tool_executing = false;
                self.emit(visible, out);
            }
            LineCategory::GreetingFragment => {
                // Repainted banner fragment after the banner already closed
            }
            category if is_chrome(category) => {
                // Spinners, borders, tips: never informative
            }
            _ => {
                if self.state.tool_executing
                    && self.classifier.is_continuation(raw_line)
                    && self.state.last_emitted.as_deref() == Some(visible.as_str())
                {
                    return;
                }
                self.emit(visible, out);
            }
        }
    }

    fn buffer_greeting_line(&mut self, visible: &str, out: &mut Vec<String>) {
        // Primary terminator: closing border glyph.
        // Secondary: a cwd: line followed by a blank line.
        let closes = self.classifier.is_greeting_end(visible)
            || (self.state.cwd_seen && visible.is_empty());

        if visible.starts_with("cwd:") || visible.contains("cwd: ") {
            self.state.cwd_seen = true;
        }

        if closes {
            if self.classifier.is_greeting_end(visible) {
                self.state.greeting_buf.push(visible.to_string());
            }
            self.close_greeting(out);
        } else {
            self.state.greeting_buf.push(visible.to_string());
        }
    }

    /// Emit the buffered banner as one contiguous unit, once per session.
    fn close_greeting(&mut self, out: &mut Vec<String>) {
        self.state.in_greeting = false;
        self.state.cwd_seen = false;
        if self.state.greeting_done {
            self.state.greeting_buf.clear();
            return;
        }
        self.state.greeting_done = true;
        debug!(lines = self.state.greeting_buf.len(), "greeting banner closed");
        for line in self.state.greeting_buf.drain(..) {
            out.push(line);
        }
        self.state.blank_streak = 0;
    }

    fn emit(&mut self, line: String, out: &mut Vec<String>) {
        // Adjacent-duplicate collapse
        if self.state.last_emitted.as_deref() == Some(line.as_str()) {
            return;
        }
        self.state.last_emitted = Some(line.clone());
        // The streak resets only on actual emission: a suppressed line
        // between two blanks must not let a second blank through
        self.state.blank_streak = 0;
        out.push(line);
    }
}

impl Default for SmartReconstructor {
    fn default() -> Self {
        Self::new(LineClassifier::default())
    }
}
