//! Durable store trait definition.

use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::error::StoreError;

/// Stores a local file and returns a public, time-limited download URL.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Name of this store implementation.
    fn name(&self) -> &str;

    /// Uploads `path` under `filename` and returns where it can be downloaded.
    async fn store(
        &self,
        cancel: &CancellationToken,
        path: &Path,
        filename: &str,
    ) -> Result<Url, StoreError>;
}
