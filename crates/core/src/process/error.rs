//! Error types for process execution.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors that can occur while running an external process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The executable does not exist.
    #[error("Executable not found: {program}")]
    NotFound { program: PathBuf },

    /// Spawning or waiting on the process failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The process exited unsuccessfully.
    ///
    /// `message` is the exit status, followed by the flattened stderr output
    /// when there was any.
    #[error("{message}")]
    Failed {
        message: String,
        exit_code: Option<i32>,
    },

    /// The cancellation scope ended while the process was running.
    #[error("Process cancelled")]
    Cancelled,
}

impl ProcessError {
    /// Builds a [`ProcessError::Failed`] from an exit status and raw stderr.
    pub fn failed(status: ExitStatus, stderr: &[u8]) -> Self {
        let message = match flatten_stderr(stderr) {
            Some(stderr) => format!("{}: {}", status, stderr),
            None => status.to_string(),
        };

        Self::Failed {
            message,
            exit_code: status.code(),
        }
    }
}

/// Joins non-empty stderr lines with `"; "` so the text fits a single log line.
pub(crate) fn flatten_stderr(stderr: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stderr);
    let flattened = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ");

    (!flattened.is_empty()).then_some(flattened)
}
