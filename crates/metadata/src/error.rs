//! Metadata store error types.

use thiserror::Error;

/// Metadata store operation errors.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl MetadataError {
    /// Map a UNIQUE violation on `images.filename` to `AlreadyExists`.
    ///
    /// SQLite reports these as "UNIQUE constraint failed: images.filename".
    pub(crate) fn from_insert(err: sqlx::Error, filename: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.message().contains("UNIQUE constraint")
            && db_err.message().contains("images.filename")
        {
            return MetadataError::AlreadyExists(format!("filename '{filename}' already exists"));
        }
        MetadataError::Database(err)
    }
}

/// Result type for metadata operations.
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;
