//! Image record CRUD endpoints under /db.

use crate::catalog;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::parse_json;
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use pinmark_metadata::{ImageRow, MetadataError};
use serde::Deserialize;

/// Body of create and update requests.
#[derive(Debug, Deserialize)]
pub struct ImageRecordRequest {
    pub filename: String,
}

fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid image id: {raw}")))
}

/// GET /db/images - All records in insertion order.
pub async fn list_records(State(state): State<AppState>) -> ApiResult<Json<Vec<ImageRow>>> {
    let rows = state.metadata.list_images().await?;
    Ok(Json(rows))
}

/// POST /db/images - Create a record.
pub async fn create_record(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<ImageRow>> {
    let body: ImageRecordRequest = parse_json(&body)?;
    let row = catalog::create_record(&state, &body.filename).await?;
    Ok(Json(row))
}

/// GET /db/images/{id} - Fetch one record.
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ImageRow>> {
    let id = parse_id(&id)?;
    let row = state
        .metadata
        .get_image(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("image id {id}")))?;
    Ok(Json(row))
}

/// PUT /db/images/{id} - Rename a record.
///
/// There is no uniqueness pre-check; a collision is still rejected by the
/// unique index and reported as a duplicate.
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<ImageRow>> {
    let id = parse_id(&id)?;
    let body: ImageRecordRequest = parse_json(&body)?;
    catalog::validate_record_filename(&body.filename)?;

    let row = state
        .metadata
        .update_image_filename(id, &body.filename)
        .await
        .map_err(|e| match e {
            MetadataError::AlreadyExists(msg) => ApiError::Duplicate(msg),
            other => other.into(),
        })?;

    tracing::info!(id, filename = %row.filename, "Updated image record");
    Ok(Json(row))
}

/// DELETE /db/images/{id} - Remove a record, returning it.
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ImageRow>> {
    let id = parse_id(&id)?;
    let row = state.metadata.delete_image(id).await?;
    tracing::info!(id, filename = %row.filename, "Deleted image record");
    Ok(Json(row))
}
