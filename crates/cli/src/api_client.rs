use anyhow::{Context, Result};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::Url;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::Path;

/// Characters escaped in a filename path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'?')
    .add(b'\\');

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url).context("invalid server URL")?;
        // Endpoint paths are joined relative to the base, so keep any prefix.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .context("failed to build API URL")
    }

    async fn send_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T> {
        let response = req.send().await?;
        let status = response.status();
        tracing::debug!(url = %response.url(), %status, "API response");
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("API error ({}): {}", status, error_detail(&body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.url("health")?;
        self.send_json(self.http.get(url)).await
    }

    pub async fn image_info(&self, file: &Path) -> Result<ImageInfo> {
        let url = self.url("getimageinfo/")?;
        let form = Form::new().part("image", file_part(file).await?);
        self.send_json(self.http.post(url).multipart(form)).await
    }

    pub async fn mark(&self, file: &Path, x: i64, y: i64) -> Result<MarkedImage> {
        let url = self.url("putmarkonimage/")?;
        let form = Form::new()
            .part("image", file_part(file).await?)
            .text("x", x.to_string())
            .text("y", y.to_string());
        self.send_json(self.http.post(url).multipart(form)).await
    }

    pub async fn list_images(&self) -> Result<Vec<String>> {
        let url = self.url("images")?;
        let response: ImageListResponse = self.send_json(self.http.get(url)).await?;
        Ok(response.images)
    }

    pub async fn delete_image(&self, filename: &str) -> Result<MessageResponse> {
        let url = self.url(&format!(
            "images/{}",
            utf8_percent_encode(filename, SEGMENT)
        ))?;
        self.send_json(self.http.delete(url)).await
    }

    pub async fn init_records(&self) -> Result<SyncResponse> {
        let url = self.url("db/images/init")?;
        self.send_json(self.http.post(url)).await
    }

    pub async fn populate_records(&self) -> Result<SyncResponse> {
        let url = self.url("db/populate")?;
        self.send_json(self.http.post(url)).await
    }

    pub async fn list_records(&self) -> Result<Vec<ImageRecord>> {
        let url = self.url("db/images")?;
        self.send_json(self.http.get(url)).await
    }

    pub async fn get_record(&self, id: i64) -> Result<ImageRecord> {
        let url = self.url(&format!("db/images/{id}"))?;
        self.send_json(self.http.get(url)).await
    }

    pub async fn create_record(&self, filename: &str) -> Result<ImageRecord> {
        let url = self.url("db/images")?;
        let req = ImageRecordRequest {
            filename: filename.to_string(),
        };
        self.send_json(self.http.post(url).json(&req)).await
    }

    pub async fn update_record(&self, id: i64, filename: &str) -> Result<ImageRecord> {
        let url = self.url(&format!("db/images/{id}"))?;
        let req = ImageRecordRequest {
            filename: filename.to_string(),
        };
        self.send_json(self.http.put(url).json(&req)).await
    }

    pub async fn delete_record(&self, id: i64) -> Result<ImageRecord> {
        let url = self.url(&format!("db/images/{id}"))?;
        self.send_json(self.http.delete(url)).await
    }

    /// Find the record for a filename, if any.
    pub async fn find_record(&self, filename: &str) -> Result<Option<ImageRecord>> {
        let records = self.list_records().await?;
        Ok(records.into_iter().find(|r| r.filename == filename))
    }
}

async fn file_part(path: &Path) -> Result<Part> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| anyhow::anyhow!("not a file path: {}", path.display()))?;
    Ok(Part::bytes(data).file_name(filename))
}

/// Prefer the server's `detail` over the raw body.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| format!("{} ({})", e.detail, e.code))
        .unwrap_or_else(|_| body.to_string())
}

// =============================================================================
// Request/response types (mirrored from server handlers)
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub detail: String,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageInfo {
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
pub struct MarkedImage {
    pub filename: String,
    pub message: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageListResponse {
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct AddedImage {
    pub id: i64,
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct SyncResponse {
    pub message: String,
    pub added_images: Vec<AddedImage>,
}

#[derive(Debug, Serialize)]
pub struct ImageRecordRequest {
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageRecord {
    pub id: i64,
    pub filename: String,
    pub filepath: Option<String>,
}
