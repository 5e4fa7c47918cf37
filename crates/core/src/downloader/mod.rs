//! Download orchestration on top of an external extraction tool.
//!
//! [`YtDlpDownloader`] turns a URL into a local video file plus metadata by
//! running `yt-dlp` inside a private scratch directory:
//!
//! 1. a fresh scratch directory is created (and removed on every exit path),
//! 2. a deterministic argument list is built from [`DownloaderConfig`],
//! 3. the tool runs through a [`ProcessRunner`](crate::process::ProcessRunner),
//! 4. the artifact and its `.info.json` sidecar are checked and parsed,
//! 5. the artifact is moved out of the scratch directory and returned.
//!
//! The caller owns the returned file and must delete it when done.
//!
//! # Example
//!
//! ```ignore
//! use videodl_core::downloader::{DownloaderConfig, VideoDownloader, YtDlpDownloader};
//!
//! let downloader = YtDlpDownloader::with_system_runner(DownloaderConfig::default());
//! let request = downloader.request(url);
//! let result = downloader.download(&cancel, &request).await?;
//! println!("{} -> {}", result.title, result.file_path.display());
//! ```

mod config;
mod cookies;
mod error;
mod traits;
mod types;
mod workspace;
mod ytdlp;

pub use config::DownloaderConfig;
pub use cookies::{stage_cookies_file, StagedCookies};
pub use error::DownloadError;
pub use traits::VideoDownloader;
pub use types::{DownloadRequest, DownloadResult, VideoInfo};
pub use ytdlp::{resolve_executable, YtDlpDownloader, INFO_JSON_NAME, OUTPUT_TEMPLATE};
