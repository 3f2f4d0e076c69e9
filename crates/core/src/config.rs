//! Configuration types shared across crates.

use crate::marker::{MAX_MARKER_RADIUS, MarkerColor, MarkerStyle};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// URL path under which stored images are served.
///
/// The default `public_base_url` ends with this prefix; the two must stay in
/// lockstep or returned URLs will not resolve.
pub const MARKED_IMAGES_ROUTE: &str = "/marked_images";

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Base URL prepended to stored filenames in API responses.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Maximum multipart request body size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Origins allowed by CORS. `["*"]` allows any origin.
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
    /// Title shown on the root page.
    #[serde(default = "default_title")]
    pub title: String,
    /// Description shown on the root page.
    #[serde(default = "default_description")]
    pub description: String,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_public_base_url() -> String {
    format!("http://127.0.0.1:8000{MARKED_IMAGES_ROUTE}")
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_title() -> String {
    "Pinmark API".to_string()
}

fn default_description() -> String {
    "Image marking service".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_base_url: default_public_base_url(),
            max_upload_bytes: default_max_upload_bytes(),
            cors_allowed_origins: default_cors_allowed_origins(),
            metrics_enabled: default_metrics_enabled(),
            title: default_title(),
            description: default_description(),
        }
    }
}

/// Image store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding marked images.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/images/marked")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Metadata store configuration (SQLite).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Database file path.
    #[serde(default = "default_metadata_path")]
    pub path: PathBuf,
    /// Seconds a query waits on a locked database before failing (default: 5).
    #[serde(default)]
    pub query_timeout_secs: Option<u64>,
}

fn default_metadata_path() -> PathBuf {
    PathBuf::from("./data/database/data.sqlite")
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            path: default_metadata_path(),
            query_timeout_secs: None,
        }
    }
}

/// Marker appearance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Circle radius in pixels.
    #[serde(default = "default_marker_radius")]
    pub radius: u32,
    /// Outline color: a name such as `red` or `#rrggbb`.
    #[serde(default)]
    pub color: MarkerColor,
    /// Outline width in pixels.
    #[serde(default = "default_marker_width")]
    pub width: u32,
}

fn default_marker_radius() -> u32 {
    20
}

fn default_marker_width() -> u32 {
    3
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            radius: default_marker_radius(),
            color: MarkerColor::default(),
            width: default_marker_width(),
        }
    }
}

impl MarkerConfig {
    pub fn style(&self) -> MarkerStyle {
        MarkerStyle {
            radius: self.radius,
            width: self.width,
            color: self.color,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.radius == 0 || self.radius > MAX_MARKER_RADIUS {
            return Err(format!(
                "marker radius must be between 1 and {MAX_MARKER_RADIUS}, got {}",
                self.radius
            ));
        }
        if self.width == 0 {
            return Err("marker width must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Validate base URL format: HTTP(S), no trailing slash.
pub fn validate_base_url(url: &str) -> Result<(), String> {
    if url.ends_with('/') {
        return Err("public_base_url must not have trailing slash".to_string());
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("public_base_url must be HTTP or HTTPS URL".to_string());
    }
    Ok(())
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Image store configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Metadata store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Marker appearance.
    #[serde(default)]
    pub marker: MarkerConfig,
}

impl AppConfig {
    /// Check invariants serde cannot express.
    pub fn validate(&self) -> crate::Result<()> {
        validate_base_url(&self.server.public_base_url).map_err(crate::Error::Config)?;
        self.marker.validate().map_err(crate::Error::Config)?;
        if self.server.max_upload_bytes == 0 {
            return Err(crate::Error::Config(
                "max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
