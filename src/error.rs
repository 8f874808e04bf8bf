//! Error types for flowstore.
//!
//! One error enum for the whole crate, with category-based exit codes for
//! the CLI (validation=4, parse=5, storage=6, config=7, I/O=8).
//!
//! Policy: read-path failures favor availability (a corrupted store is
//! reported and absorbed into the caller's empty response), write-path
//! failures favor honesty (always surfaced, no rollback of files already
//! written).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for flowstore operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in flowstore operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A record is missing a required field at encode time.
    /// Surfaced synchronously, never absorbed.
    #[error("invalid record: {0}")]
    Validation(String),

    /// A flow document failed to parse. Absorbed during directory reads
    /// (the whole read aborts), surfaced by direct decode calls.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-indexed line in the document.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A per-record write failed; files written earlier in the same
    /// attempt are left in place.
    #[error("failed saving flows to {}: {message}", dir.display())]
    Storage { dir: PathBuf, message: String },

    /// Stale-file cleanup failed after all records were written. The
    /// records themselves are durable; stale files may linger.
    #[error("failed cleaning up old flow files in {}: {message}", dir.display())]
    Cleanup { dir: PathBuf, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Other(_) => 1,
            Self::Validation(_) => 4,
            Self::Parse { .. } => 5,
            Self::Storage { .. } | Self::Cleanup { .. } => 6,
            Self::Config(_) => 7,
            Self::Io(_) | Self::Json(_) => 8,
        }
    }
}
