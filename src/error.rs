//! Error type for the compactor's outer surface.
//!
//! The engine itself has no failure modes: malformed sequences and
//! unparseable frames degrade to conservative passthrough. Errors exist
//! only at the configuration and file boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompactError {
    #[error("unknown mode '{0}', expected one of: frame, aggressive, smart-reconstruct")]
    UnknownMode(String),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
