//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pinmark_metadata::MetadataError;
use pinmark_storage::StorageError;
use serde::Serialize;

/// Detail returned for every 5xx response; causes are logged, never sent.
pub const INTERNAL_DETAIL: &str = "Internal Server Error";

/// Detail returned when a file or record is missing.
pub const NOT_FOUND_DETAIL: &str = "Image not found";

/// Detail returned when a record with the same filename exists.
pub const DUPLICATE_DETAIL: &str = "Image with this filename already exists.";

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub detail: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    #[error("undecodable image: {0}")]
    Decode(String),

    /// Marking failed; the cause was already logged by the marking path.
    #[error("image processing failed")]
    Processing,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("core error: {0}")]
    Core(#[from] pinmark_core::Error),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Duplicate(_) => "duplicate",
            Self::InvalidFilename(_) => "invalid_filename",
            Self::Decode(_) => "decode_error",
            Self::Processing => "processing_error",
            Self::Internal(_) => "internal_error",
            Self::Storage(e) => match e {
                StorageError::NotFound(_) => "not_found",
                StorageError::InvalidKey(_) => "invalid_filename",
                _ => "storage_error",
            },
            Self::Metadata(e) => match e {
                MetadataError::NotFound(_) => "not_found",
                MetadataError::AlreadyExists(_) => "duplicate",
                _ => "metadata_error",
            },
            Self::Core(e) => match e {
                pinmark_core::Error::InvalidFilename(_) => "invalid_filename",
                pinmark_core::Error::Decode(_) => "decode_error",
                _ => "core_error",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Duplicate(_) => StatusCode::BAD_REQUEST,
            Self::InvalidFilename(_) => StatusCode::BAD_REQUEST,
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::Processing => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(e) => match e {
                StorageError::NotFound(_) => StatusCode::NOT_FOUND,
                StorageError::InvalidKey(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Metadata(e) => match e {
                MetadataError::NotFound(_) => StatusCode::NOT_FOUND,
                MetadataError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Core(e) => match e {
                pinmark_core::Error::InvalidFilename(_) | pinmark_core::Error::Decode(_) => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Body detail for this error.
    pub fn detail(&self) -> String {
        if self.status_code().is_server_error() {
            return INTERNAL_DETAIL.to_string();
        }
        match self {
            Self::NotFound(_)
            | Self::Storage(StorageError::NotFound(_))
            | Self::Metadata(MetadataError::NotFound(_)) => NOT_FOUND_DETAIL.to_string(),
            Self::Duplicate(_) | Self::Metadata(MetadataError::AlreadyExists(_)) => {
                DUPLICATE_DETAIL.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() && !matches!(self, Self::Processing) {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        }
        let body = ErrorResponse {
            code: self.code().to_string(),
            detail: self.detail(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
