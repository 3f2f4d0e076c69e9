//! Stored image listing, serving, deletion and folder sync endpoints.

use crate::catalog::{self, SyncMode};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use pinmark_core::filename::{extension_of, is_allowed_image};
use pinmark_metadata::AddedImage;
use pinmark_storage::StorageError;
use serde::Serialize;

/// Message returned by the populate endpoint.
pub const POPULATED_MESSAGE: &str = "Images populated from folder";

/// Stored image listing.
#[derive(Debug, Serialize)]
pub struct ImageListResponse {
    pub images: Vec<String>,
}

/// Plain confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Folder sync result.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub message: String,
    pub added_images: Vec<AddedImage>,
}

/// GET /images - Public URLs of all stored images.
pub async fn list_images(State(state): State<AppState>) -> ApiResult<Json<ImageListResponse>> {
    let images = catalog::list_image_urls(&state).await?;
    Ok(Json(ImageListResponse { images }))
}

/// DELETE /images/{filename} - Remove a stored image.
pub async fn delete_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    catalog::delete_image(&state, &filename).await?;
    Ok(Json(MessageResponse {
        message: format!("Image {filename} deleted successfully"),
    }))
}

/// GET /marked_images/{filename} - Stream a stored image.
///
/// Only allow-listed image names are served.
pub async fn get_marked_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    if !is_allowed_image(&filename) {
        return Err(ApiError::NotFound(filename));
    }

    let meta = state.storage.head(&filename).await.map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::NotFound(filename.clone()),
        other => other.into(),
    })?;

    let stream = state.storage.get_stream(&filename).await?;
    let body_stream = stream.map(|result| result.map_err(|e| std::io::Error::other(e.to_string())));

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, content_type_for(&filename)),
            (CONTENT_LENGTH, &meta.size.to_string()),
        ],
        Body::from_stream(body_stream),
    )
        .into_response())
}

/// POST /db/images/init - Record every stored image not yet in the table.
pub async fn initialize_records(State(state): State<AppState>) -> ApiResult<Json<SyncResponse>> {
    let report = catalog::sync_records(&state, SyncMode::Initialize).await?;
    Ok(Json(SyncResponse {
        message: format!(
            "Initialization complete. Added {} new images. {} images were skipped (already in the database).",
            report.added.len(),
            report.skipped
        ),
        added_images: report.added,
    }))
}

/// POST /db/populate - Record stored images together with their file paths.
pub async fn populate_records(State(state): State<AppState>) -> ApiResult<Json<SyncResponse>> {
    let report = catalog::sync_records(&state, SyncMode::Populate).await?;
    Ok(Json(SyncResponse {
        message: POPULATED_MESSAGE.to_string(),
        added_images: report.added,
    }))
}

/// Content type for a stored image, by extension.
pub fn content_type_for(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}
