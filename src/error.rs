//! Error types for rubric.

use thiserror::Error;

/// Result type for rubric operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for rubric operations.
///
/// Domain-data problems (a malformed provenance, an out-of-range confidence)
/// are NOT errors: validators return `bool` and record an event on the
/// [`EventLog`](crate::events::EventLog). This enum covers I/O, malformed
/// input files, and programming-contract violations only.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input file could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Fatal configuration problem (missing input path, output collision).
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
