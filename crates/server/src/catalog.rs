//! Read, sync and delete paths over the image store and the record table.

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;
use futures::TryStreamExt;
use pinmark_core::is_allowed_image;
use pinmark_metadata::{AddedImage, MetadataError};
use pinmark_storage::StorageError;

/// How a folder sync fills the `filepath` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    /// Record filenames only.
    Initialize,
    /// Record filenames and their backing file locations.
    Populate,
}

/// Outcome of a folder sync.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub added: Vec<AddedImage>,
    pub skipped: usize,
}

/// Allow-listed stored filenames, in store enumeration order.
pub async fn stored_images(state: &AppState) -> ApiResult<Vec<String>> {
    let names: Vec<String> = state
        .storage
        .list_stream()
        .await?
        .try_filter(|name| futures::future::ready(is_allowed_image(name)))
        .try_collect()
        .await?;
    Ok(names)
}

/// Public URLs of every allow-listed stored image.
pub async fn list_image_urls(state: &AppState) -> ApiResult<Vec<String>> {
    let names = stored_images(state).await?;
    Ok(names.iter().map(|name| state.public_url(name)).collect())
}

/// Remove a stored image. Records are left untouched.
pub async fn delete_image(state: &AppState, filename: &str) -> ApiResult<()> {
    match state.storage.delete(filename).await {
        Ok(()) => {
            metrics::IMAGES_DELETED.inc();
            tracing::info!(filename = %filename, "Deleted stored image");
            Ok(())
        }
        Err(StorageError::NotFound(_)) => Err(ApiError::NotFound(filename.to_string())),
        Err(StorageError::InvalidKey(reason)) => Err(ApiError::InvalidFilename(reason)),
        Err(e) => Err(e.into()),
    }
}

/// Insert a record for every allow-listed stored image not yet recorded.
///
/// Existing filenames are skipped, so a re-run after a partial failure
/// completes the table.
pub async fn sync_records(state: &AppState, mode: SyncMode) -> ApiResult<SyncReport> {
    state.metadata.migrate().await?;

    let mut report = SyncReport::default();
    for name in stored_images(state).await? {
        let location = match mode {
            SyncMode::Initialize => None,
            SyncMode::Populate => Some(state.storage.location(&name)),
        };

        match state
            .metadata
            .insert_image_if_absent(&name, location.as_deref())
            .await?
        {
            Some(row) => report.added.push(AddedImage::from(&row)),
            None => report.skipped += 1,
        }
    }

    metrics::RECORDS_SYNCED.inc_by(report.added.len() as u64);
    tracing::info!(
        mode = ?mode,
        added = report.added.len(),
        skipped = report.skipped,
        "Synced image records from store"
    );
    Ok(report)
}

/// Create a record through the API.
pub async fn create_record(state: &AppState, filename: &str) -> ApiResult<pinmark_metadata::ImageRow> {
    validate_record_filename(filename)?;
    let row = state
        .metadata
        .create_image(filename, None)
        .await
        .map_err(|e| match e {
            MetadataError::AlreadyExists(msg) => ApiError::Duplicate(msg),
            other => other.into(),
        })?;

    metrics::RECORDS_CREATED.inc();
    tracing::info!(id = row.id, filename = %row.filename, "Created image record");
    Ok(row)
}

/// Record filenames must be non-empty; anything else is stored verbatim.
pub fn validate_record_filename(filename: &str) -> ApiResult<()> {
    if filename.trim().is_empty() {
        return Err(ApiError::InvalidFilename(
            "filename must not be empty".to_string(),
        ));
    }
    Ok(())
}
