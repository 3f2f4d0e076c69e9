//! Application state shared across handlers.

use pinmark_core::MarkerStyle;
use pinmark_core::config::AppConfig;
use pinmark_metadata::MetadataStore;
use pinmark_storage::ImageStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Marked image store.
    pub storage: Arc<dyn ImageStore>,
    /// Image record store.
    pub metadata: Arc<dyn MetadataStore>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn ImageStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            metadata,
        }
    }

    /// Marker appearance from configuration.
    pub fn marker_style(&self) -> MarkerStyle {
        self.config.marker.style()
    }

    /// Public URL for a stored filename.
    pub fn public_url(&self, filename: &str) -> String {
        pinmark_core::public_url(&self.config.server.public_base_url, filename)
    }
}
