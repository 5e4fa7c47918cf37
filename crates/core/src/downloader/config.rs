//! Configuration for the downloader module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the yt-dlp based downloader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Path or name of the yt-dlp binary.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,

    /// Netscape formatted cookies file for authenticated sites.
    #[serde(default)]
    pub cookies_file: Option<PathBuf>,

    /// JavaScript runtimes hint passed to yt-dlp (e.g. "node", "deno").
    #[serde(default)]
    pub js_runtimes: Option<String>,

    /// Maximum number of downloads running at the same time (1-100).
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_downloads: usize,

    /// Parent directory for scratch directories and downloaded files.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Smaller responses are treated as error pages.
    #[serde(default = "default_min_filesize")]
    pub min_filesize: String,

    /// Larger artifacts are refused.
    #[serde(default = "default_max_filesize")]
    pub max_filesize: String,

    /// Retry count for whole downloads and single fragments.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Maximum length of the output file name.
    #[serde(default = "default_filename_max_length")]
    pub filename_max_length: u32,
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_max_concurrent() -> usize {
    5
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("video-dl-bot")
}

fn default_min_filesize() -> String {
    "50K".to_string()
}

fn default_max_filesize() -> String {
    "2G".to_string()
}

fn default_retries() -> u32 {
    5
}

fn default_filename_max_length() -> u32 {
    64
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            cookies_file: None,
            js_runtimes: None,
            max_concurrent_downloads: default_max_concurrent(),
            temp_dir: default_temp_dir(),
            min_filesize: default_min_filesize(),
            max_filesize: default_max_filesize(),
            retries: default_retries(),
            filename_max_length: default_filename_max_length(),
        }
    }
}

impl DownloaderConfig {
    /// Sets the yt-dlp binary path.
    pub fn with_ytdlp_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ytdlp_path = path.into();
        self
    }

    /// Sets the temp directory.
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// Sets the cookies file.
    pub fn with_cookies_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookies_file = Some(path.into());
        self
    }

    /// Sets the JavaScript runtimes hint.
    pub fn with_js_runtimes(mut self, runtimes: impl Into<String>) -> Self {
        self.js_runtimes = Some(runtimes.into());
        self
    }

    /// Sets the maximum number of concurrent downloads.
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent_downloads = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DownloaderConfig::default();
        assert_eq!(config.ytdlp_path, PathBuf::from("yt-dlp"));
        assert_eq!(config.max_concurrent_downloads, 5);
        assert_eq!(config.min_filesize, "50K");
        assert_eq!(config.max_filesize, "2G");
        assert_eq!(config.retries, 5);
        assert!(config.cookies_file.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = DownloaderConfig::default()
            .with_ytdlp_path("/usr/local/bin/yt-dlp")
            .with_temp_dir("/tmp/test")
            .with_cookies_file("/secrets/cookies.txt")
            .with_js_runtimes("deno")
            .with_max_concurrent(8);

        assert_eq!(config.ytdlp_path, PathBuf::from("/usr/local/bin/yt-dlp"));
        assert_eq!(config.temp_dir, PathBuf::from("/tmp/test"));
        assert_eq!(
            config.cookies_file,
            Some(PathBuf::from("/secrets/cookies.txt"))
        );
        assert_eq!(config.js_runtimes.as_deref(), Some("deno"));
        assert_eq!(config.max_concurrent_downloads, 8);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: DownloaderConfig = toml::from_str(
            r#"
            js_runtimes = "node"
            max_concurrent_downloads = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.js_runtimes.as_deref(), Some("node"));
        assert_eq!(config.max_concurrent_downloads, 2);
        assert_eq!(config.ytdlp_path, PathBuf::from("yt-dlp"));
    }
}
