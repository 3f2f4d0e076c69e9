//! Write path: inspect uploads and store marked copies.

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;
use bytes::Bytes;
use pinmark_core::{Dimensions, marked_filename, sanitize_upload_name};
use serde::Serialize;

/// Message returned after a successful mark.
pub const MARKED_MESSAGE: &str = "Image marked and saved successfully.";

/// Result of inspecting an upload.
#[derive(Debug, Serialize)]
pub struct ImageInfo {
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// Result of marking an upload.
#[derive(Debug, Serialize)]
pub struct MarkedImage {
    pub filename: String,
    pub message: &'static str,
    pub url: String,
}

/// Decode an upload and report its dimensions.
///
/// Decoding runs on the blocking pool. Undecodable bytes are a client error.
pub async fn inspect(filename: String, data: Bytes) -> ApiResult<ImageInfo> {
    let dims: Dimensions =
        tokio::task::spawn_blocking(move || pinmark_core::marker::inspect(&data))
            .await
            .map_err(|e| ApiError::Internal(format!("inspect task failed: {e}")))?
            .map_err(|e| ApiError::Decode(e.to_string()))?;

    metrics::IMAGES_INSPECTED.inc();
    tracing::debug!(
        filename = %filename,
        width = dims.width,
        height = dims.height,
        "Inspected image"
    );

    Ok(ImageInfo {
        filename,
        width: dims.width,
        height: dims.height,
    })
}

/// Draw the configured marker at `(x, y)` and store the result under the
/// derived `_marked` name.
///
/// Every decode, draw or write failure is logged here and surfaces as
/// [`ApiError::Processing`].
pub async fn mark(
    state: &AppState,
    filename: &str,
    data: Bytes,
    x: i64,
    y: i64,
) -> ApiResult<MarkedImage> {
    let base = sanitize_upload_name(filename)?;
    let stored_name = marked_filename(&base);

    match render_and_store(state, &stored_name, data, x, y).await {
        Ok(()) => {
            metrics::IMAGES_MARKED.inc();
            tracing::info!(filename = %stored_name, x, y, "Image marked");
            Ok(MarkedImage {
                url: state.public_url(&stored_name),
                filename: stored_name,
                message: MARKED_MESSAGE,
            })
        }
        Err(e) => {
            metrics::MARK_FAILURES.inc();
            tracing::error!(filename = %stored_name, x, y, error = %e, "Failed to mark image");
            Err(ApiError::Processing)
        }
    }
}

async fn render_and_store(
    state: &AppState,
    stored_name: &str,
    data: Bytes,
    x: i64,
    y: i64,
) -> anyhow::Result<()> {
    let style = state.marker_style();
    let output_name = stored_name.to_string();

    let encoded = tokio::task::spawn_blocking(move || {
        pinmark_core::marker::render_marked(&data, &output_name, x, y, &style)
    })
    .await??;

    state.storage.put(stored_name, Bytes::from(encoded)).await?;
    Ok(())
}
