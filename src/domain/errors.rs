//! Domain errors for the glyph operator.
//!
//! The analysis core is total and never returns these; they cover the edges
//! where outside data enters the system (frame construction, motif labels,
//! series files and recorded sessions).

use thiserror::Error;

/// Domain-level errors raised at the boundaries of the analysis core.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid frame {width}x{height}: expected {expected} RGBA bytes, got {actual}")]
    InvalidFrame {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid motif label: {0}")]
    InvalidMotif(String),

    #[error("Unknown sampling strategy: {0}")]
    InvalidStrategy(String),

    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    #[error("Session parse error at line {line}: {reason}")]
    SessionParse { line: usize, reason: String },

    #[error("Sampling worker has stopped")]
    WorkerStopped,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}
