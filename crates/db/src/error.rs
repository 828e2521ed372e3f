use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the SQLite store.
///
/// These cover infrastructure failures only. Business conditions such as a
/// missing employee are reported by callers as values, not through this type.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to open sqlite database at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to configure connection: {source}")]
    Configure { source: rusqlite::Error },

    #[error("failed to execute SQL statement: {source}")]
    Execute { source: rusqlite::Error },

    #[error("failed to query database: {source}")]
    Query { source: rusqlite::Error },

    #[error("transaction failed: {source}")]
    Transaction { source: rusqlite::Error },

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: String,
        source: rusqlite::Error,
    },

    #[error("column '{column}' is missing from the result row")]
    MissingColumn { column: String },

    #[error("failed to decode column '{column}': {message}")]
    Decode { column: String, message: String },

    #[error("sqlite connection mutex was poisoned")]
    Poisoned,
}
