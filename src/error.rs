//! Error type shared by extraction, reading and writing.

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the feature pipeline.
pub enum FeatureError {
    /// Invalid window/step/n-gram or writer configuration.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    /// A residue has no exchange-group mapping (strict alphabet policy only).
    #[error("Residue {residue:?} at position {position} has no exchange-group mapping")]
    Alphabet {
        /// Offending residue.
        residue: char,
        /// 0-based offset within the sequence.
        position: usize,
    },
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed FASTA input.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FeatureError>;

impl FeatureError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        FeatureError::Configuration(msg.into())
    }
}
