//! Mock process runner for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::downloader::INFO_JSON_NAME;
use crate::process::{ProcessError, ProcessInvocation, ProcessOutcome, ProcessRunner};

/// Files the mock writes into the `--paths` directory of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedDownload {
    /// Exit successfully without writing anything.
    NoOutput,
    /// Write `result.<ext>` and a well formed sidecar.
    Complete { extension: String, size_bytes: u64 },
    /// Write `result.<ext>` but no sidecar.
    ArtifactOnly { extension: String, size_bytes: u64 },
    /// Write `result.<ext>` and a sidecar with the given raw content.
    Custom {
        extension: String,
        size_bytes: u64,
        info_json: String,
    },
}

impl SimulatedDownload {
    /// A complete download with the given extension and size.
    pub fn video(extension: &str, size_bytes: u64) -> Self {
        Self::Complete {
            extension: extension.to_string(),
            size_bytes,
        }
    }
}

/// Mock implementation of the ProcessRunner trait.
///
/// Behaves like yt-dlp as far as the file system is concerned: when the
/// invocation carries `--paths <dir>`, the configured [`SimulatedDownload`]
/// is written into that directory. Artifacts are sparse files, so large sizes
/// are cheap.
///
/// # Example
///
/// ```rust,ignore
/// use videodl_core::testing::{MockProcessRunner, SimulatedDownload};
///
/// let runner = MockProcessRunner::new();
/// runner.set_simulation(SimulatedDownload::video("mp4", 10 * 1024 * 1024)).await;
///
/// let downloader = YtDlpDownloader::new(config, runner.clone());
/// downloader.download(&cancel, &request).await?;
///
/// assert_eq!(runner.invocation_count().await, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockProcessRunner {
    /// Recorded invocations.
    invocations: Arc<RwLock<Vec<ProcessInvocation>>>,
    /// What to write on success.
    simulation: Arc<RwLock<SimulatedDownload>>,
    /// If set, the next run will fail with this error.
    next_error: Arc<RwLock<Option<ProcessError>>>,
    /// Simulated run time.
    delay: Arc<RwLock<Duration>>,
    /// Stdout returned on success.
    stdout: Arc<RwLock<Vec<u8>>>,
}

impl Default for MockProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProcessRunner {
    /// Create a new mock runner that writes nothing.
    pub fn new() -> Self {
        Self {
            invocations: Arc::new(RwLock::new(Vec::new())),
            simulation: Arc::new(RwLock::new(SimulatedDownload::NoOutput)),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            stdout: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get all recorded invocations.
    pub async fn recorded_invocations(&self) -> Vec<ProcessInvocation> {
        self.invocations.read().await.clone()
    }

    /// Get the number of runs performed.
    pub async fn invocation_count(&self) -> usize {
        self.invocations.read().await.len()
    }

    /// Set what successful runs write to disk.
    pub async fn set_simulation(&self, simulation: SimulatedDownload) {
        *self.simulation.write().await = simulation;
    }

    /// Configure the next run to fail with the given error.
    pub async fn set_next_error(&self, error: ProcessError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated run time.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Set the stdout returned by successful runs.
    pub async fn set_stdout(&self, stdout: impl Into<Vec<u8>>) {
        *self.stdout.write().await = stdout.into();
    }

    async fn write_outputs(
        simulation: &SimulatedDownload,
        dir: &Path,
        source_url: &str,
    ) -> std::io::Result<()> {
        let (extension, size_bytes, info_json) = match simulation {
            SimulatedDownload::NoOutput => return Ok(()),
            SimulatedDownload::Complete {
                extension,
                size_bytes,
            } => (extension, *size_bytes, Some(Self::info_json(source_url))),
            SimulatedDownload::ArtifactOnly {
                extension,
                size_bytes,
            } => (extension, *size_bytes, None),
            SimulatedDownload::Custom {
                extension,
                size_bytes,
                info_json,
            } => (extension, *size_bytes, Some(info_json.clone())),
        };

        let artifact = tokio::fs::File::create(dir.join(format!("result.{}", extension))).await?;
        artifact.set_len(size_bytes).await?;

        if let Some(info_json) = info_json {
            tokio::fs::write(dir.join(INFO_JSON_NAME), info_json).await?;
        }

        Ok(())
    }

    fn info_json(source_url: &str) -> String {
        serde_json::json!({
            "id": "mock-video",
            "title": "Mock video",
            "fulltitle": "Mock video (full title)",
            "description": "A video produced by the mock runner",
            "webpage_url": source_url,
            "media_type": "video",
            "extractor": "mock",
            "resolution": "1280x720",
            "duration": 12.5,
        })
        .to_string()
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(
        &self,
        cancel: &CancellationToken,
        invocation: &ProcessInvocation,
    ) -> Result<ProcessOutcome, ProcessError> {
        self.invocations.write().await.push(invocation.clone());

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let delay = *self.delay.read().await;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProcessError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }

        if let Some(dir) = invocation.flag_value("--paths") {
            let source_url = invocation.args.last().map(String::as_str).unwrap_or_default();
            let simulation = self.simulation.read().await.clone();
            Self::write_outputs(&simulation, &PathBuf::from(dir), source_url).await?;
        }

        Ok(ProcessOutcome {
            stdout: self.stdout.read().await.clone(),
            stderr: Vec::new(),
            elapsed: delay,
        })
    }
}
