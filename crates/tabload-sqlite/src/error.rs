//! Error types for the SQLite executor.

use tabload_core::LoadError;

/// Errors raised outside of a write: connecting, reading back rows.
#[derive(Debug, thiserror::Error)]
pub enum SqliteError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The blocking runtime could not be started.
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    /// Rows read back do not form a table.
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Result type for SQLite operations.
pub type Result<T> = std::result::Result<T, SqliteError>;
