//! Metadata store abstraction and the SQLite implementation for Pinmark.
//!
//! This crate owns the `images` table: one row per recorded image filename,
//! unique by filename.

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use models::{AddedImage, ImageRow};
pub use repos::ImageRepo;
pub use store::{MetadataStore, SqliteStore};

use pinmark_core::config::MetadataConfig;
use std::sync::Arc;

/// Create a metadata store from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    if config.path.as_os_str().is_empty() {
        return Err(MetadataError::Config(
            "metadata.path must not be empty".to_string(),
        ));
    }

    tracing::info!(path = %config.path.display(), "Opening SQLite metadata store");
    let store = SqliteStore::new(&config.path, config.query_timeout_secs).await?;
    Ok(Arc::new(store) as Arc<dyn MetadataStore>)
}
