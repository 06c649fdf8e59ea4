//! Error types for roster database operations.
//!
//! Every error belongs to one of three kinds (see [`ErrorKind`]). The kind
//! decides how callers react: connection and I/O failures end the process,
//! query failures end a dump or seed run but only skip one console line.

use std::path::PathBuf;

use roster_core::ValidationError;
use thiserror::Error;

/// Coarse failure category carried across component boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Opening the database failed.
    Connection,
    /// A statement could not be prepared or executed, or its result was unusable.
    Query,
    /// Reading input or writing output failed.
    Io,
}

/// Errors that can occur during roster database operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened.
    #[error("failed to open database '{}': {source}", path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// SQLite statement failure.
    #[error("query error: {0}")]
    Query(#[from] rusqlite::Error),

    /// File or stream I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Table is not present in the user-visible catalog.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// Identifier failed validation.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(ValidationError),

    /// Seeding target failed validation.
    #[error("invalid seed target: {0}")]
    InvalidSeedTarget(ValidationError),

    /// The stored `section_statuses` JSON could not be read or written.
    #[error("section status encoding error: {0}")]
    StatusEncoding(#[from] serde_json::Error),

    /// A stored value could not be represented (e.g. text that is not UTF-8).
    #[error("corrupt row in {table}: {reason}")]
    CorruptRow { table: String, reason: String },
}

impl StoreError {
    /// The failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Connection { .. } => ErrorKind::Connection,
            StoreError::Io(_) => ErrorKind::Io,
            StoreError::Query(_)
            | StoreError::TableNotFound(_)
            | StoreError::InvalidIdentifier(_)
            | StoreError::InvalidSeedTarget(_)
            | StoreError::StatusEncoding(_)
            | StoreError::CorruptRow { .. } => ErrorKind::Query,
        }
    }
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
