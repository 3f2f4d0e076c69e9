//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// A boxed stream of bytes for streaming reads.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// A boxed stream of stored filenames.
pub type KeyStream = Pin<Box<dyn Stream<Item = StorageResult<String>> + Send>>;

/// Flat store of image files addressed by filename.
///
/// Keys are single filenames; backends reject anything that could resolve
/// outside their root.
#[async_trait]
pub trait ImageStore: Send + Sync + 'static {
    /// Size of a stored file. `NotFound` when absent or not a regular file.
    async fn head(&self, key: &str) -> StorageResult<ObjectMeta>;

    /// Open a stored file as a byte stream.
    async fn get_stream(&self, key: &str) -> StorageResult<ByteStream>;

    /// Store a file atomically, replacing any existing one.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Delete a file. Returns `NotFound` if it does not exist.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Stream stored filenames in backend enumeration order.
    async fn list_stream(&self) -> StorageResult<KeyStream>;

    /// Backend-specific location of a key (a filesystem path for local storage).
    fn location(&self, key: &str) -> String;

    /// Verify storage backend accessibility.
    ///
    /// The default implementation returns Ok(()).
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Metadata about a stored file.
#[derive(Clone, Debug)]
pub struct ObjectMeta {
    /// Size in bytes.
    pub size: u64,
}
