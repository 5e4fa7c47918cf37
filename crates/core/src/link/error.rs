//! Error types for link extraction.

use thiserror::Error;

/// Reasons why no link could be extracted from a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The message was empty or contained only whitespace.
    #[error("Empty text provided")]
    EmptyText,

    /// Nothing in the message looks like a link.
    #[error("No link found")]
    NotFound,

    /// A link-shaped token was found but it is not a usable URL.
    #[error("Invalid URL extracted: {candidate}")]
    InvalidUrl { candidate: String },
}
