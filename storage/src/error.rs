//! Storage error types.

use dbot_core::DbotError;
use thiserror::Error;

/// Errors that can occur in state storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid key: {0}")]
    KeyBuild(String),
    #[error("Unsupported storage url: {0}")]
    UnsupportedUrl(String),
}

impl From<StorageError> for DbotError {
    fn from(e: StorageError) -> Self {
        DbotError::Storage(e.to_string())
    }
}
