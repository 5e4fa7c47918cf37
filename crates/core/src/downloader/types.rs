//! Types for the downloader module.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// A single download request. Built once per inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub source_url: Url,
    /// Cookies file passed to the tool for authenticated sessions.
    pub cookies_file: Option<PathBuf>,
    /// JavaScript runtime hint for sites with anti-bot challenges.
    pub js_runtimes: Option<String>,
}

impl DownloadRequest {
    pub fn new(source_url: Url) -> Self {
        Self {
            source_url,
            cookies_file: None,
            js_runtimes: None,
        }
    }

    pub fn with_cookies_file(mut self, path: Option<PathBuf>) -> Self {
        self.cookies_file = path;
        self
    }

    pub fn with_js_runtimes(mut self, runtimes: Option<String>) -> Self {
        self.js_runtimes = runtimes;
        self
    }
}

/// A finished download.
///
/// The caller owns `file_path` and is responsible for deleting it.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    pub file_path: PathBuf,
    pub id: String,
    pub title: String,
    pub full_title: String,
    pub description: String,
    pub webpage_url: String,
    pub media_type: String,
    pub extractor: String,
    pub resolution: String,
    pub duration: Duration,
}

impl DownloadResult {
    /// File extension of the downloaded artifact, with a leading dot.
    pub fn extension(&self) -> String {
        self.file_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default()
    }
}

/// The subset of the `.info.json` sidecar the bot cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fulltitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub extractor: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl VideoInfo {
    /// Combines the sidecar with the final location of the artifact.
    pub fn into_result(self, file_path: &Path) -> DownloadResult {
        let duration = self
            .duration
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f64)
            .unwrap_or_default();

        DownloadResult {
            file_path: file_path.to_path_buf(),
            id: self.id,
            title: self.title.unwrap_or_default(),
            full_title: self.fulltitle.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            webpage_url: self.webpage_url.unwrap_or_default(),
            media_type: self.media_type.unwrap_or_default(),
            extractor: self.extractor.unwrap_or_default(),
            resolution: self.resolution.unwrap_or_default(),
            duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_info() {
        let json = r#"{
            "id": "dQw4w9WgXcQ",
            "title": "Never Gonna Give You Up",
            "fulltitle": "Rick Astley - Never Gonna Give You Up",
            "description": "The official video",
            "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "media_type": "video",
            "extractor": "youtube",
            "resolution": "1920x1080",
            "duration": 212.5,
            "formats": [{"format_id": "137"}]
        }"#;

        let info: VideoInfo = serde_json::from_str(json).unwrap();
        let result = info.into_result(Path::new("/tmp/video-1.mp4"));

        assert_eq!(result.id, "dQw4w9WgXcQ");
        assert_eq!(result.full_title, "Rick Astley - Never Gonna Give You Up");
        assert_eq!(result.extractor, "youtube");
        assert_eq!(result.resolution, "1920x1080");
        assert_eq!(result.duration, Duration::from_millis(212_500));
        assert_eq!(result.extension(), ".mp4");
    }

    #[test]
    fn test_parse_sparse_info() {
        let json = r#"{"id": "42", "title": null, "duration": null}"#;
        let info: VideoInfo = serde_json::from_str(json).unwrap();
        let result = info.into_result(Path::new("/tmp/video"));

        assert_eq!(result.id, "42");
        assert_eq!(result.title, "");
        assert_eq!(result.duration, Duration::ZERO);
        assert_eq!(result.extension(), "");
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let result: Result<VideoInfo, _> = serde_json::from_str(r#"{"title": "x"}"#);
        assert!(result.is_err());
    }
}
