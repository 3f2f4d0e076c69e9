//! Image record repository trait.

use crate::error::MetadataResult;
use crate::models::ImageRow;
use async_trait::async_trait;

/// Repository for image records.
#[async_trait]
pub trait ImageRepo: Send + Sync {
    /// Insert a new record.
    ///
    /// Returns `AlreadyExists` if a record with the same filename exists.
    async fn create_image(&self, filename: &str, filepath: Option<&str>)
    -> MetadataResult<ImageRow>;

    /// Insert a record unless one with the same filename exists.
    ///
    /// Returns `None` when the filename was already present.
    async fn insert_image_if_absent(
        &self,
        filename: &str,
        filepath: Option<&str>,
    ) -> MetadataResult<Option<ImageRow>>;

    /// List all records ordered by id.
    async fn list_images(&self) -> MetadataResult<Vec<ImageRow>>;

    /// Get a record by id.
    async fn get_image(&self, id: i64) -> MetadataResult<Option<ImageRow>>;

    /// Get a record by filename.
    async fn get_image_by_filename(&self, filename: &str) -> MetadataResult<Option<ImageRow>>;

    /// Change a record's filename, returning the updated row.
    async fn update_image_filename(&self, id: i64, filename: &str) -> MetadataResult<ImageRow>;

    /// Delete a record, returning the row as it was before deletion.
    async fn delete_image(&self, id: i64) -> MetadataResult<ImageRow>;
}
