//! Line classification for agent terminal output.
//!
//! Every visible (ANSI-stripped) line gets exactly one category from a
//! fixed, ordered rule list. Rule order is significant: chrome patterns are
//! checked before the generic content fallback, and the first match wins.
//! The categories double as the documented grammar for consumers parsing a
//! compacted transcript.

use regex::Regex;
use unicode_width::UnicodeWidthStr;

/// Whether a tool result line still has a pending outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultState {
    /// `Waiting…` / `Running…` - outcome not yet known
    Transient,
    /// States a concrete outcome ("Found 40 lines", checkmark, error)
    Final,
}

/// Category assigned to one visible line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCategory {
    /// Spinner/status animation or other one-shot chrome
    StatusAnimation,
    /// Line consisting only of box-drawing characters
    BoxDrawing,
    /// Tool invocation (`● Read(file.ts)`)
    ToolInvocation,
    /// Tool result continuation (`⎿ Found 40 lines`)
    ToolResult(ResultState),
    /// Echo of a command the user typed (`> fix the tests`)
    CommandEcho,
    /// Border or content of the greeting banner box
    GreetingFragment,
    /// Usage tip or suggestion hint
    Tip,
    /// Anything informative that matched no chrome rule
    PlainContent,
    /// Blank after stripping
    Empty,
}

/// Spinner marker glyphs used by agent CLIs.
///
/// The first group is the Claude spinner family, the second the braille
/// spinner used by Gemini and most Node CLI spinners.
pub const SPINNER_GLYPHS: &[char] = &[
    '\u{273B}', '\u{2733}', '\u{2722}', '\u{2736}', '\u{273D}', '\u{2735}', '\u{2734}', // ✻ ✳ ✢ ✶ ✽ ✵ ✴
    '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}',
    '\u{2827}', '\u{2807}', '\u{280F}', // ⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏
    '\u{00B7}', '\u{2217}', '*', '+', // · ∗ fallback ASCII spinners
];

/// Marker glyph that opens a tool invocation line.
pub const TOOL_MARKER: char = '\u{25CF}'; // ●

/// Marker glyph that opens a tool result line.
pub const RESULT_MARKER: char = '\u{23BF}'; // ⎿

/// Ordered first-match-wins line classifier.
///
/// Construct once per session; classification itself is a pure function of
/// the input line.
pub struct LineClassifier {
    /// Lines shorter than this (in display columns) are never PlainContent
    min_content_width: usize,
    box_only: Regex,
    command_echo: Regex,
    suggestion: Regex,
    chrome: Regex,
    status: Regex,
    result_transient: Regex,
    greeting_text: Regex,
    tip: Regex,
    tool_name: Regex,
}

impl LineClassifier {
    pub fn new(min_content_width: usize) -> Self {
        Self {
            min_content_width,
            // Only box-drawing and block characters (plus whitespace)
            box_only: Regex::new(r"^[\u{2500}-\u{257F}\u{2580}-\u{259F}\s]+$").unwrap(),
            // Input field echo: "> text" possibly inside a box border
            command_echo: Regex::new(r"^[\u{2502}\u{2503}|]?\s*>\s+\S").unwrap(),
            suggestion: Regex::new(r#"^\s*Try "[^"]+""#).unwrap(),
            // Permission prompts, IDE connection notices, shortcut bars
            chrome: Regex::new(
                r"(\? for shortcuts|esc to interrupt|auto-accept edits|shift\+tab to cycle|Press Ctrl|ctrl\+[a-z] to|IDE (dis)?connected|Bypassing Permissions)",
            )
            .unwrap(),
            // "<spinner> Word… (" - animated status counter
            status: Regex::new(r"^.\s+[A-Z][\w-]*(\u{2026}|\.{3})\s*\(").unwrap(),
            result_transient: Regex::new(r"^(Waiting|Running)(\u{2026}|\.{3})?\s*$").unwrap(),
            greeting_text: Regex::new(r"(Welcome to|Sonnet|Opus|GPT-|Gemini)").unwrap(),
            tip: Regex::new(r"^(\u{203B}\s*)?Tip:").unwrap(),
            tool_name: Regex::new(r"^\u{25CF}\s+([A-Za-z][\w-]*)").unwrap(),
        }
    }

    /// Classify one visible line. Pure: no state is read or written.
    pub fn classify(&self, line: &str) -> LineCategory {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineCategory::Empty;
        }
        if self.box_only.is_match(trimmed) {
            return LineCategory::BoxDrawing;
        }
        if self.command_echo.is_match(trimmed) {
            return LineCategory::CommandEcho;
        }
        if self.suggestion.is_match(trimmed) || self.tip.is_match(trimmed) {
            return LineCategory::Tip;
        }
        if self.chrome.is_match(trimmed) {
            return LineCategory::StatusAnimation;
        }
        if self.is_status_line(trimmed) {
            return LineCategory::StatusAnimation;
        }
        if trimmed.starts_with(TOOL_MARKER) {
            return LineCategory::ToolInvocation;
        }
        if let Some(rest) = trimmed.strip_prefix(RESULT_MARKER) {
            let body = rest.trim_start();
            if self.result_transient.is_match(body) {
                return LineCategory::ToolResult(ResultState::Transient);
            }
            return LineCategory::ToolResult(ResultState::Final);
        }
        if self.is_greeting_fragment(trimmed) {
            return LineCategory::GreetingFragment;
        }
        // Short fragments are redraw debris, never durable content
        if UnicodeWidthStr::width(trimmed) < self.min_content_width {
            return LineCategory::StatusAnimation;
        }
        LineCategory::PlainContent
    }

    /// Spinner/status line: marker glyph, word, ellipsis, open paren.
    pub fn is_status_line(&self, line: &str) -> bool {
        let Some(first) = line.chars().next() else {
            return false;
        };
        SPINNER_GLYPHS.contains(&first) && self.status.is_match(line)
    }

    /// Greeting banner border or its recognized content.
    fn is_greeting_fragment(&self, line: &str) -> bool {
        let Some(first) = line.chars().next() else {
            return false;
        };
        matches!(first, '\u{256D}' | '\u{2570}' | '\u{250C}' | '\u{2514}' | '\u{2502}')
            || self.greeting_text.is_match(line)
    }

    /// Opening border glyph of the greeting box (╭ or ┌).
    pub fn is_greeting_start(&self, line: &str) -> bool {
        matches!(line.chars().next(), Some('\u{256D}') | Some('\u{250C}'))
    }

    /// Closing border glyph of the greeting box (╰ or └).
    pub fn is_greeting_end(&self, line: &str) -> bool {
        matches!(line.chars().next(), Some('\u{2570}') | Some('\u{2514}'))
    }

    /// Extract the tool name from an invocation line (`● Read(...)` → `Read`).
    pub fn tool_name<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.tool_name
            .captures(line.trim())
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// Deeply indented continuation still animating (`    reading…(`).
    pub fn is_continuation(&self, raw_line: &str) -> bool {
        let indent = raw_line.len() - raw_line.trim_start().len();
        let trimmed = raw_line.trim_end();
        indent >= 4 && (trimmed.ends_with("\u{2026}(") || trimmed.ends_with("...("))
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(5)
    }
}

/// True for categories that never carry durable information.
pub fn is_chrome(category: LineCategory) -> bool {
    matches!(
        category,
        LineCategory::StatusAnimation
            | LineCategory::BoxDrawing
            | LineCategory::Tip
            | LineCategory::ToolResult(ResultState::Transient)
    )
}
