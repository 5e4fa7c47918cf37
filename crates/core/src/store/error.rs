//! Error types for the store module.

use std::path::PathBuf;
use thiserror::Error;

/// Step of the store protocol that produced an unexpected response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStage {
    Upload,
    Lock,
}

impl std::fmt::Display for StoreStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upload => write!(f, "upload"),
            Self::Lock => write!(f, "locking bin"),
        }
    }
}

/// Errors that can occur while storing a file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the local file failed.
    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {0}")]
    Client(reqwest::Error),

    /// The request failed before a response arrived.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with an unexpected status.
    #[error("Unexpected status code after {stage}: {status} ({body})")]
    UnexpectedStatus {
        stage: StoreStage,
        status: u16,
        body: String,
    },

    /// The public URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The cancellation scope ended during the upload.
    #[error("Upload cancelled")]
    Cancelled,
}

impl StoreError {
    /// Creates an unexpected status error.
    pub fn unexpected_status(stage: StoreStage, status: u16, body: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            stage,
            status,
            body: body.into(),
        }
    }
}
