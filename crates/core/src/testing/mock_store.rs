//! Mock durable store for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::store::{DurableStore, StoreError};

/// A recorded upload for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    /// The local file that was uploaded.
    pub path: PathBuf,
    /// The name it was stored under.
    pub filename: String,
    /// Size of the file when it was uploaded.
    pub size_bytes: u64,
}

/// Mock implementation of the DurableStore trait.
///
/// Returns `https://store.invalid/<n>/<filename>` for the n-th upload.
#[derive(Debug, Clone)]
pub struct MockStore {
    /// Recorded uploads.
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    /// If set, the next upload will fail with this error.
    next_error: Arc<RwLock<Option<StoreError>>>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    /// Create a new mock store.
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded uploads.
    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    /// Get the number of uploads performed.
    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    /// Configure the next upload to fail with the given error.
    pub async fn set_next_error(&self, error: StoreError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl DurableStore for MockStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn store(
        &self,
        cancel: &CancellationToken,
        path: &Path,
        filename: &str,
    ) -> Result<Url, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let size_bytes = tokio::fs::metadata(path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        let mut uploads = self.uploads.write().await;
        uploads.push(RecordedUpload {
            path: path.to_path_buf(),
            filename: filename.to_string(),
            size_bytes,
        });

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        Url::parse(&format!("https://store.invalid/{}/{}", uploads.len(), filename))
            .map_err(|e| StoreError::InvalidUrl(e.to_string()))
    }
}
