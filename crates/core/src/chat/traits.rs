//! Chat sink trait definition.

use async_trait::async_trait;
use std::path::Path;
use url::Url;

use super::error::ChatError;
use super::types::{ActivityKind, Marker, MessageRef, TextFormat};

/// Outbound side of the chat platform.
///
/// Every call is best effort: it either succeeds or returns an error, and the
/// caller decides whether the error matters.
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Replies to `to` with a text message.
    async fn reply_text(
        &self,
        to: &MessageRef,
        text: &str,
        format: TextFormat,
    ) -> Result<(), ChatError>;

    /// Replies to `to` with a video read from a local file.
    async fn reply_video(&self, to: &MessageRef, path: &Path, size_bytes: u64)
        -> Result<(), ChatError>;

    /// Replies to `to` with a MarkdownV2 text and a single URL button.
    async fn reply_link(
        &self,
        to: &MessageRef,
        text: &str,
        button_text: &str,
        url: &Url,
    ) -> Result<(), ChatError>;

    /// Replaces the marker on the original message. `None` clears it.
    async fn set_marker(&self, to: &MessageRef, marker: Option<Marker>) -> Result<(), ChatError>;

    /// Shows an activity indicator in the chat for a few seconds.
    async fn send_activity(&self, chat_id: i64, kind: ActivityKind) -> Result<(), ChatError>;
}
