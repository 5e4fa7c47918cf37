//! Trait definitions for the downloader module.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::error::DownloadError;
use super::types::{DownloadRequest, DownloadResult};

/// Something that can turn a URL into a local video file.
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    /// Returns the name of this downloader implementation.
    fn name(&self) -> &str;

    /// Builds a request for `url` with the downloader's default options.
    fn request(&self, url: Url) -> DownloadRequest {
        DownloadRequest::new(url)
    }

    /// Downloads the video. On success the caller owns the returned file.
    async fn download(
        &self,
        cancel: &CancellationToken,
        request: &DownloadRequest,
    ) -> Result<DownloadResult, DownloadError>;
}
