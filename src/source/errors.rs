//! Data-source error types.
//!
//! These errors never reach the HTTP layer: the resolver and the suggest
//! builder both degrade to "no result" at the point of use. They exist so
//! that boot and reload can report why a source failed to open.

use thiserror::Error;

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors raised by the primary and backup SQLite sources
#[derive(Debug, Error)]
pub enum SourceError {
    /// Database file could not be opened
    #[error("failed to open source database {path}: {reason}")]
    Open { path: String, reason: String },

    /// Query failed (including requests for columns the schema lacks)
    #[error("source query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// A blocking lookup task was cancelled or panicked
    #[error("lookup task failed: {0}")]
    Task(String),
}
