//! Storage crate: conversation state (FSM) backends for [`dbot_core::StateStorage`].
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`key_builder`] – DefaultKeyBuilder for string-keyed backends
//! - [`memory`] – MemoryStorage (process-local)
//! - [`sqlite`] – SqliteStorage (sqlx)
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod key_builder;
mod memory;
mod sqlite;
mod sqlite_pool;

use std::sync::Arc;

use dbot_core::StateStorage;
use tracing::info;

pub use error::StorageError;
pub use key_builder::{DefaultKeyBuilder, KeyPart};
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
pub use sqlite_pool::SqlitePoolManager;

/// Opens the storage named by `url`: `memory` (or `memory://`) for [`MemoryStorage`];
/// `sqlite:<path>`, `sqlite://<path>`, `file:<path>` or a bare path for [`SqliteStorage`].
pub async fn open_state_storage(url: &str) -> Result<Arc<dyn StateStorage>, StorageError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(StorageError::UnsupportedUrl(url.to_string()));
    }
    if url == "memory" || url == "memory://" {
        info!("Using in-memory FSM storage");
        return Ok(Arc::new(MemoryStorage::new()));
    }
    if url.contains("://") && !url.starts_with("sqlite://") {
        return Err(StorageError::UnsupportedUrl(url.to_string()));
    }

    let path = sqlite_path(url);
    info!(path = %path, "Using SQLite FSM storage");
    Ok(Arc::new(SqliteStorage::new(path).await?))
}

fn sqlite_path(url: &str) -> &str {
    if url == "sqlite::memory:" {
        return url;
    }
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .or_else(|| url.strip_prefix("file:"))
        .unwrap_or(url)
}
