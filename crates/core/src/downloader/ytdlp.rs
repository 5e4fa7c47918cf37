//! yt-dlp based downloader implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::process::{ProcessInvocation, ProcessRunner, SystemRunner};

use super::config::DownloaderConfig;
use super::error::DownloadError;
use super::traits::VideoDownloader;
use super::types::{DownloadRequest, DownloadResult, VideoInfo};
use super::workspace;

/// Output template handed to yt-dlp. Always produces `result.<ext>`.
pub const OUTPUT_TEMPLATE: &str = "result.%(ext)s";

/// Name of the metadata sidecar written next to the artifact.
pub const INFO_JSON_NAME: &str = "result.info.json";

/// Resolves the extraction tool once at startup.
///
/// Accepts either a bare name looked up in `PATH` or a path to the binary.
pub fn resolve_executable(name: &Path) -> Result<PathBuf, DownloadError> {
    which::which(name).map_err(|source| DownloadError::ExecutableNotFound {
        name: name.to_path_buf(),
        source,
    })
}

/// Downloader that shells out to yt-dlp.
pub struct YtDlpDownloader<R: ProcessRunner> {
    config: DownloaderConfig,
    runner: R,
}

impl YtDlpDownloader<SystemRunner> {
    /// Creates a downloader that runs the real yt-dlp binary.
    pub fn with_system_runner(config: DownloaderConfig) -> Self {
        Self::new(config, SystemRunner::new())
    }
}

impl<R: ProcessRunner> YtDlpDownloader<R> {
    /// Creates a new downloader with the given configuration and runner.
    pub fn new(config: DownloaderConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// Builds the yt-dlp argument list for one download.
    ///
    /// The output is fully determined by the configuration, the request and
    /// the scratch directory.
    pub fn build_args(&self, request: &DownloadRequest, scratch_dir: &Path) -> Vec<String> {
        let retries = self.config.retries.to_string();
        let max_size = &self.config.max_filesize;

        let mut args = vec![
            // Ignore config files on the host
            "--ignore-config".to_string(),
            "--no-colors".to_string(),
            // Tiny responses are usually error pages
            "--min-filesize".to_string(),
            self.config.min_filesize.clone(),
            "--max-filesize".to_string(),
            max_size.clone(),
            "--no-playlist".to_string(),
            "--concurrent-fragments".to_string(),
            "1".to_string(),
            "--retries".to_string(),
            retries.clone(),
            "--fragment-retries".to_string(),
            retries,
            "--abort-on-unavailable-fragments".to_string(),
            // Output location and naming
            "--paths".to_string(),
            scratch_dir.to_string_lossy().to_string(),
            "--output".to_string(),
            OUTPUT_TEMPLATE.to_string(),
            "--restrict-filenames".to_string(),
            "--trim-filenames".to_string(),
            self.config.filename_max_length.to_string(),
            "--no-continue".to_string(),
            "--no-overwrites".to_string(),
            "--write-info-json".to_string(),
            // Combined stream first, then a separate video+audio pair, then anything
            "--format".to_string(),
            format!("b[filesize<{max_size}]/bv*[filesize<{max_size}]+ba[filesize<{max_size}]/b"),
            "--no-progress".to_string(),
        ];

        if let Some(cookies) = &request.cookies_file {
            args.extend(["--cookies".to_string(), cookies.to_string_lossy().to_string()]);
        }

        if let Some(runtimes) = &request.js_runtimes {
            args.extend(["--js-runtimes".to_string(), runtimes.clone()]);
        }

        args.push(request.source_url.to_string());

        args
    }

    /// Returns the installed yt-dlp version.
    pub async fn version(&self, cancel: &CancellationToken) -> Result<String, DownloadError> {
        let invocation = ProcessInvocation::new(&self.config.ytdlp_path).arg("--version");
        let outcome = self.runner.run(cancel, &invocation).await?;

        Ok(outcome.stdout_lossy().trim().to_string())
    }

    /// Reads and parses the metadata sidecar.
    async fn read_info(path: &Path) -> Result<VideoInfo, DownloadError> {
        let raw = tokio::fs::read(path)
            .await
            .map_err(|_| DownloadError::MissingMetadata {
                path: path.to_path_buf(),
            })?;

        serde_json::from_slice(&raw).map_err(|e| DownloadError::InvalidMetadata {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl<R: ProcessRunner> VideoDownloader for YtDlpDownloader<R> {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    fn request(&self, url: Url) -> DownloadRequest {
        DownloadRequest::new(url)
            .with_cookies_file(self.config.cookies_file.clone())
            .with_js_runtimes(self.config.js_runtimes.clone())
    }

    async fn download(
        &self,
        cancel: &CancellationToken,
        request: &DownloadRequest,
    ) -> Result<DownloadResult, DownloadError> {
        // Removed when this guard drops, on every exit path.
        let scratch = workspace::create_scratch_dir(&self.config.temp_dir).await?;

        let invocation = ProcessInvocation::new(&self.config.ytdlp_path)
            .args(self.build_args(request, scratch.path()));

        let outcome = self.runner.run(cancel, &invocation).await?;

        debug!(
            video_url = %request.source_url,
            runner = self.runner.name(),
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "yt-dlp finished"
        );

        let artifact = workspace::find_artifact(scratch.path())
            .await?
            .ok_or_else(|| DownloadError::MissingArtifact {
                dir: scratch.path().to_path_buf(),
            })?;

        let info_path = scratch.path().join(INFO_JSON_NAME);
        if !tokio::fs::try_exists(&info_path).await.unwrap_or(false) {
            return Err(DownloadError::MissingMetadata { path: info_path });
        }

        let info = Self::read_info(&info_path).await?;

        // Both files were produced by a process that has exited, so nothing
        // writes to them anymore.
        let file_path = workspace::relocate(&artifact, &self.config.temp_dir).await?;

        info!(
            video_url = %request.source_url,
            video_id = %info.id,
            extractor = info.extractor.as_deref().unwrap_or_default(),
            file_path = %file_path.display(),
            "Video downloaded"
        );

        Ok(info.into_result(&file_path))
    }
}
