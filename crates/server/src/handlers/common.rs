//! Service banner, health check and shared extractor helpers.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::response::Html;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET / - Service banner.
pub async fn root(State(state): State<AppState>) -> Html<String> {
    let server = &state.config.server;
    Html(format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><title>{title}</title></head>\n\
         <body>\n\
         <h1>{title}</h1>\n\
         <p>{description}</p>\n\
         <p>Version {version}</p>\n\
         <p><a href=\"/images\">Marked images</a></p>\n\
         </body>\n\
         </html>\n",
        title = escape_html(&server.title),
        description = escape_html(&server.description),
        version = env!("CARGO_PKG_VERSION"),
    ))
}

/// GET /health - Check metadata and image store access.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state.metadata.health_check().await?;
    state.storage.health_check().await?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

/// Parse a JSON request body, mapping failures to 400.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
