//! # Store Errors
//!
//! Failures raised by record store backends. Every variant surfaces to
//! clients as a server error; none are retried.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Disk I/O failure
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Collection file failed verification
    #[error("Collection file corrupted at line {line}: {reason}")]
    Corruption { line: usize, reason: String },

    /// Record violates a model constraint
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A writer panicked while holding the collection lock
    #[error("Lock poisoned")]
    LockPoisoned,

    /// Database URL names no known backend
    #[error("Unsupported database URL: {0}")]
    UnsupportedUrl(String),

    /// Collection file already exists
    #[error("Collection already initialized at {0}")]
    AlreadyInitialized(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
