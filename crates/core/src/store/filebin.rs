//! filebin.net store implementation.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, StatusCode};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use super::config::FileBinConfig;
use super::error::{StoreError, StoreStage};
use super::traits::DurableStore;

const BIN_ID_LEN: usize = 16;

/// Store backed by a filebin instance.
pub struct FileBinStore {
    client: Client,
    config: FileBinConfig,
}

impl FileBinStore {
    /// Creates a new store.
    pub fn new(config: FileBinConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(StoreError::Client)?;

        Ok(Self { client, config })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Random lowercase alphanumeric bin name.
    fn new_bin_id() -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(BIN_ID_LEN);
        id
    }

    async fn upload(&self, path: &Path, filename: &str) -> Result<Url, StoreError> {
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        let bin_id = Self::new_bin_id();
        let upload_url = format!("{}/{}/{}", self.base_url(), bin_id, filename);
        let public_url =
            Url::parse(&upload_url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;

        let size = tokio::fs::metadata(path).await.map_err(io_err)?.len();
        let hash = sha256_file(path).await.map_err(io_err)?;

        debug!(
            bin_id = %bin_id,
            file_name = filename,
            file_size = size,
            "Uploading file to filebin"
        );

        let file = tokio::fs::File::open(path).await.map_err(io_err)?;

        let response = self
            .client
            .post(public_url.clone())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(ACCEPT, "application/json")
            .header("Content-SHA256", &hash)
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read response body".to_string());
            return Err(StoreError::unexpected_status(
                StoreStage::Upload,
                status.as_u16(),
                body,
            ));
        }

        // Locked bins are read-only.
        let response = self
            .client
            .put(format!("{}/{}", self.base_url(), bin_id))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::unexpected_status(
                StoreStage::Lock,
                status.as_u16(),
                body,
            ));
        }

        info!(
            bin_id = %bin_id,
            file_size = size,
            url = %public_url,
            "File uploaded to filebin"
        );

        Ok(public_url)
    }
}

#[async_trait]
impl DurableStore for FileBinStore {
    fn name(&self) -> &str {
        "filebin"
    }

    async fn store(
        &self,
        cancel: &CancellationToken,
        path: &Path,
        filename: &str,
    ) -> Result<Url, StoreError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StoreError::Cancelled),
            result = self.upload(path, filename) => result,
        }
    }
}

/// Hex encoded SHA-256 of a file, read in chunks.
async fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
