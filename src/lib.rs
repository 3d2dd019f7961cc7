//! Agent Transcript Compactor (ATC) Library
//!
//! A Rust library for collapsing the animated, escape-heavy terminal output
//! of AI agent sessions into compact, readable transcripts.

pub mod analyzer;
pub mod classify;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod escape;
pub mod frame;
pub mod reconstruct;
pub mod screen;
pub mod session;
pub mod status;

pub use analyzer::{PatternAnalyzer, TranscriptReport};
pub use classify::{LineCategory, LineClassifier, ResultState};
pub use config::{CompactConfig, CompactMode};
pub use dedup::FrameDeduplicator;
pub use error::CompactError;
pub use escape::{strip_ansi, visible_line, EscapeClassifier};
pub use frame::{Frame, FrameSegmenter};
pub use reconstruct::SmartReconstructor;
pub use screen::VirtualScreen;
pub use session::CompactSession;
pub use status::StatusLineBuffer;
