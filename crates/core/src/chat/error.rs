//! Error types for the chat boundary.

use thiserror::Error;

/// Errors reported by a chat sink.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    /// The platform rejected the request.
    #[error("Chat API error: {0}")]
    Api(String),

    /// A local file to be sent could not be read.
    #[error("File error: {0}")]
    File(String),

    /// The platform could not be reached.
    #[error("Network error: {0}")]
    Network(String),
}
