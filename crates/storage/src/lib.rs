//! Image storage abstraction and backends for Pinmark.
//!
//! This crate provides:
//! - A flat, filename-keyed image store with atomic writes
//! - A local filesystem backend with traversal and symlink protection

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::filesystem::FilesystemBackend;
pub use error::{StorageError, StorageResult};
pub use traits::{ByteStream, ImageStore, KeyStream, ObjectMeta};

use pinmark_core::config::StorageConfig;
use std::sync::Arc;

/// Create an image store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ImageStore>> {
    if config.path.as_os_str().is_empty() {
        return Err(StorageError::Config("storage.path must not be empty".to_string()));
    }

    let backend = FilesystemBackend::new(&config.path).await?;
    Ok(Arc::new(backend))
}
