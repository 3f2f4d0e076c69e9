//! Server test utilities.

use super::fixtures::BOUNDARY;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::TryStreamExt;
use pinmark_core::config::{AppConfig, MetadataConfig, StorageConfig};
use pinmark_metadata::{MetadataStore, SqliteStore};
use pinmark_server::{AppState, create_router};
use pinmark_storage::{FilesystemBackend, ImageStore};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub storage_path: PathBuf,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let storage_path = temp_dir.path().join("images").join("marked");
        let storage: Arc<dyn ImageStore> = Arc::new(
            FilesystemBackend::new(&storage_path)
                .await
                .expect("Failed to create storage backend"),
        );

        let db_path = temp_dir.path().join("database").join("data.sqlite");
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(&db_path, None)
                .await
                .expect("Failed to create metadata store"),
        );

        let mut config = AppConfig {
            storage: StorageConfig {
                path: storage_path.clone(),
            },
            metadata: MetadataConfig {
                path: db_path,
                query_timeout_secs: None,
            },
            ..Default::default()
        };
        modifier(&mut config);

        let state = AppState::new(config, storage, metadata);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            storage_path,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying metadata.
    pub fn metadata(&self) -> Arc<dyn MetadataStore> {
        self.state.metadata.clone()
    }

    /// Every filename the image store lists, sorted.
    pub async fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .state
            .storage
            .list_stream()
            .await
            .expect("Failed to list store")
            .try_collect()
            .await
            .expect("Failed to list store");
        names.sort();
        names
    }

    /// Write a file straight into the image store directory.
    pub fn seed_file(&self, name: &str, data: &[u8]) {
        std::fs::write(self.storage_path.join(name), data).expect("Failed to seed file");
    }
}

/// Send a request and decode the JSON response (Null when empty or not JSON).
#[allow(dead_code)]
pub async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Helper to make JSON requests.
#[allow(dead_code)]
pub async fn json_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    send(router, builder.body(body).unwrap()).await
}

/// POST a multipart body built by `fixtures::multipart_body`.
#[allow(dead_code)]
pub async fn multipart_request(
    router: &axum::Router,
    uri: &str,
    body: Vec<u8>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    send(router, request).await
}
