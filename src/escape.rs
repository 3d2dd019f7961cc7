//! ANSI/VT escape sequence decoding and stripping.
//!
//! Raw agent output is dominated by control sequences driving spinner
//! animations and partial-screen redraws. This module decodes them into a
//! small semantic vocabulary and produces the visible text that remains
//! after removal.
//!
//! Chunk boundaries are arbitrary: a sequence may be split across two
//! chunks. A truncated trailing sequence is carried over to the next call
//! rather than treated as an error.

use std::fmt;

/// Scope of an erase operation (CSI J / CSI K).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseScope {
    /// From cursor to end of line/screen (mode 0)
    ToEnd,
    /// From start of line/screen to cursor (mode 1)
    ToStart,
    /// Entire line/screen (mode 2)
    All,
}

/// Decoded meaning of a single control sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    CursorUp(u32),
    CursorDown(u32),
    CursorForward(u32),
    CursorBack(u32),
    CursorTo { row: u32, col: u32 },
    CursorColumn(u32),
    EraseInLine(EraseScope),
    EraseInDisplay(EraseScope),
    /// SGR with an explicit reset (CSI m or CSI 0m)
    SgrReset,
    /// Any other SGR attribute change
    Sgr(Vec<u16>),
    HideCursor,
    ShowCursor,
    /// DEC private mode set (CSI ? n h)
    SetPrivateMode(u32),
    /// DEC private mode reset (CSI ? n l)
    ResetPrivateMode(u32),
    /// Operating system command (title, hyperlink, ...)
    Osc(String),
    /// Recognized as a sequence by the generic grammar but not decoded
    Other(String),
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlKind::CursorUp(n) => write!(f, "cursor up {}", n),
            ControlKind::CursorDown(n) => write!(f, "cursor down {}", n),
            ControlKind::CursorForward(n) => write!(f, "cursor forward {}", n),
            ControlKind::CursorBack(n) => write!(f, "cursor back {}", n),
            ControlKind::CursorTo { row, col } => write!(f, "cursor to {};{}", row, col),
            ControlKind::CursorColumn(n) => write!(f, "cursor to column {}", n),
            ControlKind::EraseInLine(scope) => write!(f, "erase line ({})", scope_name(scope)),
            ControlKind::EraseInDisplay(scope) => write!(f, "erase screen ({})", scope_name(scope)),
            ControlKind::SgrReset => write!(f, "attributes reset"),
            ControlKind::Sgr(params) => write!(f, "attributes {:?}", params),
            ControlKind::HideCursor => write!(f, "hide cursor"),
            ControlKind::ShowCursor => write!(f, "show cursor"),
            ControlKind::SetPrivateMode(n) => write!(f, "set mode ?{}", n),
            ControlKind::ResetPrivateMode(n) => write!(f, "reset mode ?{}", n),
            ControlKind::Osc(s) => write!(f, "osc {}", s),
            ControlKind::Other(s) => write!(f, "unrecognized {:?}", s),
        }
    }
}

fn scope_name(scope: &EraseScope) -> &'static str {
    match scope {
        EraseScope::ToEnd => "to end",
        EraseScope::ToStart => "to start",
        EraseScope::All => "all",
    }
}

/// One control sequence found in a fragment: the raw bytes and the meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSequence {
    pub raw: String,
    pub kind: ControlKind,
}

/// Result of classifying one fragment.
#[derive(Debug, Default)]
pub struct StripResult {
    /// The fragment with all recognized sequences removed
    pub visible: String,
    /// Sequences found, in order of appearance
    pub sequences: Vec<ControlSequence>,
}

/// Stateful escape sequence classifier with chunk-boundary carry-over.
#[derive(Debug, Default)]
pub struct EscapeClassifier {
    /// Unconsumed trailing bytes of a sequence split across chunks
    carry: String,
}

impl EscapeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one fragment, prepending any carried-over partial sequence.
    ///
    /// A sequence truncated at the end of the fragment is retained for the
    /// next call; `flush` drops whatever never completed.
    pub fn classify(&mut self, fragment: &str) -> StripResult {
        let input = if self.carry.is_empty() {
            fragment.to_string()
        } else {
            let mut joined = std::mem::take(&mut self.carry);
            joined.push_str(fragment);
            joined
        };

        let mut result = StripResult::default();
        let chars: Vec<char> = input.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            if chars[i] != '\x1b' {
                result.visible.push(chars[i]);
                i += 1;
                continue;
            }
            match parse_sequence(&chars[i..]) {
                Parsed::Complete { consumed, seq } => {
                    result.sequences.push(seq);
                    i += consumed;
                }
                Parsed::Truncated => {
                    // Retain from ESC to end of input for the next chunk
                    self.carry = chars[i..].iter().collect();
                    break;
                }
                Parsed::NotASequence => {
                    // Bare ESC followed by something unexpected: drop the ESC
                    i += 1;
                }
            }
        }

        result
    }

    /// Discard any incomplete trailing sequence (end of stream).
    pub fn flush(&mut self) {
        self.carry.clear();
    }

    /// True if a partial sequence is waiting for more input.
    pub fn has_pending(&self) -> bool {
        !self.carry.is_empty()
    }
}

enum Parsed {
    Complete { consumed: usize, seq: ControlSequence },
    Truncated,
    NotASequence,
}

/// Parse one sequence starting at an ESC byte.
fn parse_sequence(chars: &[char]) -> Parsed {
    debug_assert_eq!(chars[0], '\x1b');
    let Some(&second) = chars.get(1) else {
        return Parsed::Truncated;
    };

    match second {
        '[' => parse_csi(chars),
        ']' => parse_osc(chars),
        // Simple two-byte escapes: ESC c (reset), ESC 7/8 (save/restore)
        c if c.is_ascii_alphanumeric() || c == '=' || c == '>' => {
            let raw: String = chars[..2].iter().collect();
            Parsed::Complete {
                consumed: 2,
                seq: ControlSequence {
                    kind: ControlKind::Other(raw.clone()),
                    raw,
                },
            }
        }
        '(' | ')' => {
            // Charset designation takes one more byte
            if chars.len() < 3 {
                return Parsed::Truncated;
            }
            let raw: String = chars[..3].iter().collect();
            Parsed::Complete {
                consumed: 3,
                seq: ControlSequence {
                    kind: ControlKind::Other(raw.clone()),
                    raw,
                },
            }
        }
        _ => Parsed::NotASequence,
    }
}

/// Parse a CSI sequence: ESC [ parameters finalByte.
fn parse_csi(chars: &[char]) -> Parsed {
    let mut params = String::new();
    let mut i = 2;
    loop {
        let Some(&c) = chars.get(i) else {
            return Parsed::Truncated;
        };
        if c.is_ascii_digit() || c == ';' || c == '?' || c == '>' || c == '!' || c == ' ' {
            params.push(c);
            i += 1;
        } else if ('\x40'..='\x7e').contains(&c) {
            // Final byte
            let raw: String = chars[..=i].iter().collect();
            let kind = decode_csi(&params, c, &raw);
            return Parsed::Complete {
                consumed: i + 1,
                seq: ControlSequence { raw, kind },
            };
        } else {
            // Malformed: byte outside CSI grammar, abandon the sequence
            return Parsed::NotASequence;
        }
    }
}

/// Parse an OSC sequence: ESC ] ... (BEL | ESC \).
fn parse_osc(chars: &[char]) -> Parsed {
    let mut i = 2;
    loop {
        let Some(&c) = chars.get(i) else {
            return Parsed::Truncated;
        };
        if c == '\x07' {
            let raw: String = chars[..=i].iter().collect();
            let payload: String = chars[2..i].iter().collect();
            return Parsed::Complete {
                consumed: i + 1,
                seq: ControlSequence {
                    raw,
                    kind: ControlKind::Osc(payload),
                },
            };
        }
        if c == '\x1b' {
            match chars.get(i + 1) {
                Some('\\') => {
                    let raw: String = chars[..i + 2].iter().collect();
                    let payload: String = chars[2..i].iter().collect();
                    return Parsed::Complete {
                        consumed: i + 2,
                        seq: ControlSequence {
                            raw,
                            kind: ControlKind::Osc(payload),
                        },
                    };
                }
                Some(_) => {
                    i += 1;
                }
                None => return Parsed::Truncated,
            }
        }
        i += 1;
    }
}

fn decode_csi(params: &str, final_byte: char, raw: &str) -> ControlKind {
    let first_num = || -> u32 {
        params
            .trim_start_matches(['?', '>', '!'])
            .split(';')
            .next()
            .and_then(|p| p.parse().ok())
            .filter(|&n| n != 0)
            .unwrap_or(1)
    };

    match final_byte {
        'A' => ControlKind::CursorUp(first_num()),
        'B' => ControlKind::CursorDown(first_num()),
        'C' => ControlKind::CursorForward(first_num()),
        'D' => ControlKind::CursorBack(first_num()),
        'G' => ControlKind::CursorColumn(first_num()),
        'H' | 'f' => {
            let mut parts = params.split(';');
            let row = parts.next().and_then(|p| p.parse().ok()).unwrap_or(1);
            let col = parts.next().and_then(|p| p.parse().ok()).unwrap_or(1);
            ControlKind::CursorTo { row, col }
        }
        'J' | 'K' => {
            let scope = match params.parse::<u32>().unwrap_or(0) {
                1 => EraseScope::ToStart,
                2 => EraseScope::All,
                _ => EraseScope::ToEnd,
            };
            if final_byte == 'K' {
                ControlKind::EraseInLine(scope)
            } else {
                ControlKind::EraseInDisplay(scope)
            }
        }
        'm' => {
            let values: Vec<u16> = params
                .split(';')
                .filter_map(|p| p.parse().ok())
                .collect();
            if values.is_empty() || values == [0] {
                ControlKind::SgrReset
            } else {
                ControlKind::Sgr(values)
            }
        }
        'h' if params.starts_with('?') => {
            let n: u32 = params[1..].parse().unwrap_or(0);
            if n == 25 {
                ControlKind::ShowCursor
            } else {
                ControlKind::SetPrivateMode(n)
            }
        }
        'l' if params.starts_with('?') => {
            let n: u32 = params[1..].parse().unwrap_or(0);
            if n == 25 {
                ControlKind::HideCursor
            } else {
                ControlKind::ResetPrivateMode(n)
            }
        }
        _ => ControlKind::Other(raw.to_string()),
    }
}

/// Strip all control sequences from a complete piece of text.
///
/// Stateless convenience over [`EscapeClassifier`] for callers that hold a
/// whole line or transcript. An incomplete trailing sequence is dropped.
pub fn strip_ansi(text: &str) -> String {
    let mut classifier = EscapeClassifier::new();
    let result = classifier.classify(text);
    result.visible
}

/// Strip sequences and carriage returns, then trim surrounding whitespace.
///
/// This is the "visible line" form used by the line classifier.
pub fn visible_line(raw: &str) -> String {
    strip_ansi(raw).replace('\r', "").trim().to_string()
}
