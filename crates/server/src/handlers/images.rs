//! Upload endpoints: inspect and mark.

use crate::error::{ApiError, ApiResult};
use crate::marking::{self, ImageInfo, MarkedImage};
use crate::state::AppState;
use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use bytes::Bytes;
use std::collections::HashMap;

/// A parsed multipart upload.
#[derive(Debug)]
pub struct Upload {
    /// Client-supplied filename of the file part.
    pub filename: String,
    /// File content.
    pub data: Bytes,
    /// Text fields, by name.
    pub fields: HashMap<String, String>,
}

impl Upload {
    /// Read every part. The first part carrying a filename is the file;
    /// named parts without one are text fields.
    pub async fn read(multipart: Result<Multipart, MultipartRejection>) -> ApiResult<Self> {
        let mut multipart =
            multipart.map_err(|e| ApiError::BadRequest(format!("expected multipart form: {e}")))?;

        let mut file: Option<(String, Bytes)> = None;
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().map(str::to_string);
            match field.file_name().map(str::to_string) {
                Some(filename) if file.is_none() => {
                    let data = field.bytes().await.map_err(multipart_error)?;
                    file = Some((filename, data));
                }
                Some(_) => {
                    tracing::debug!(field = ?name, "Ignoring extra file part");
                }
                None => {
                    let value = field.text().await.map_err(multipart_error)?;
                    if let Some(name) = name {
                        fields.insert(name, value);
                    }
                }
            }
        }

        let (filename, data) =
            file.ok_or_else(|| ApiError::BadRequest("missing file part".to_string()))?;

        Ok(Self {
            filename,
            data,
            fields,
        })
    }

    /// Parse a required integer text field.
    pub fn int_field(&self, name: &str) -> ApiResult<i64> {
        let raw = self
            .fields
            .get(name)
            .ok_or_else(|| ApiError::BadRequest(format!("missing field '{name}'")))?;
        raw.trim()
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("field '{name}' must be an integer")))
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(format!("malformed multipart body: {}", e.body_text()))
    }
}

/// POST /getimageinfo/ - Report an uploaded image's dimensions.
pub async fn get_image_info(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImageInfo>> {
    let upload = Upload::read(multipart).await?;
    let info = marking::inspect(upload.filename, upload.data).await?;
    Ok(Json(info))
}

/// POST /putmarkonimage/ - Mark an uploaded image at `(x, y)` and store it.
pub async fn put_mark_on_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<MarkedImage>> {
    let upload = Upload::read(multipart).await?;
    let x = upload.int_field("x")?;
    let y = upload.int_field("y")?;

    let marked = marking::mark(&state, &upload.filename, upload.data, x, y).await?;
    Ok(Json(marked))
}
