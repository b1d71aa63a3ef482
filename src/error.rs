//! Error types for TabKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using TabError
pub type Result<T> = std::result::Result<T, TabError>;

/// Unified error type for TabKV operations
#[derive(Debug, Error)]
pub enum TabError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Transaction Log Errors
    // -------------------------------------------------------------------------
    /// A log line that does not decode into an event record
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    /// A record whose sequence does not exceed the one before it
    #[error("out of sequence at line {line}: sequence {found} does not follow {previous}")]
    OutOfSequence { line: u64, previous: u64, found: u64 },

    /// I/O failure while scanning the log during replay
    #[error("failed to read transaction log at line {line}: {source}")]
    LogRead {
        line: u64,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while appending; the log stops durably recording after this
    #[error("failed to append record {sequence} to transaction log: {source}")]
    LogWrite {
        sequence: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("transaction log appender has halted")]
    LogHalted,

    #[error("transaction log is already closed")]
    AlreadyClosed,

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("key must not be empty")]
    InvalidKey,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TabError {
    /// True for failures that make the transaction log unusable
    pub fn is_durability_failure(&self) -> bool {
        matches!(self, TabError::LogWrite { .. } | TabError::LogHalted)
    }
}
