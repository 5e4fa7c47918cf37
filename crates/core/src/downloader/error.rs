//! Error types for the downloader module.

use std::path::PathBuf;
use thiserror::Error;

use crate::process::ProcessError;

/// Errors that can occur while downloading a video.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The extraction tool could not be located.
    #[error("Executable not found: {name}")]
    ExecutableNotFound {
        name: PathBuf,
        #[source]
        source: which::Error,
    },

    /// The scratch directory could not be created.
    #[error("Failed to create scratch directory in {path}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The extraction tool failed.
    #[error("yt-dlp: {0}")]
    Process(ProcessError),

    /// The tool exited successfully but left no artifact behind.
    #[error("Downloaded file not found in {dir}")]
    MissingArtifact { dir: PathBuf },

    /// The tool exited successfully but wrote no metadata sidecar.
    #[error("Metadata file not found: {path}")]
    MissingMetadata { path: PathBuf },

    /// The metadata sidecar is not what the tool is supposed to write.
    #[error("Invalid metadata in {path}: {reason}")]
    InvalidMetadata { path: PathBuf, reason: String },

    /// The artifact could not be moved out of the scratch directory.
    #[error("Failed to move {from} to {to}")]
    Relocate {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cookies file could not be staged.
    #[error("Failed to prepare cookies file {path}")]
    Cookies {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cancellation scope ended during the download.
    #[error("Download cancelled")]
    Cancelled,

    /// Other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProcessError> for DownloadError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Cancelled => Self::Cancelled,
            other => Self::Process(other),
        }
    }
}

impl DownloadError {
    /// The tool reported success but its output does not match what was asked
    /// for. Usually means the flags and the installed tool version disagree.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::MissingArtifact { .. } | Self::MissingMetadata { .. } | Self::InvalidMetadata { .. }
        )
    }

    /// Whether the error was caused by cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
