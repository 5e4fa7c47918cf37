//! Inline or durable-store delivery.

use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::chat::{ChatSink, MessageRef};
use crate::store::DurableStore;

use super::config::DEFAULT_INLINE_LIMIT;
use super::error::DeliveryError;
use super::types::{size_mb, Delivery};

/// Routes an artifact to the requester based on its size.
pub struct DeliveryRouter {
    sink: Arc<dyn ChatSink>,
    store: Arc<dyn DurableStore>,
    inline_limit_bytes: u64,
}

impl DeliveryRouter {
    /// Creates a router with the default inline limit.
    pub fn new(sink: Arc<dyn ChatSink>, store: Arc<dyn DurableStore>) -> Self {
        Self {
            sink,
            store,
            inline_limit_bytes: DEFAULT_INLINE_LIMIT,
        }
    }

    /// Sets the largest size sent inline.
    pub fn with_inline_limit(mut self, bytes: u64) -> Self {
        self.inline_limit_bytes = bytes;
        self
    }

    pub fn inline_limit(&self) -> u64 {
        self.inline_limit_bytes
    }

    /// Whether an artifact of `size_bytes` is sent as an attachment.
    pub fn is_inline(&self, size_bytes: u64) -> bool {
        size_bytes <= self.inline_limit_bytes
    }

    /// Hands `artifact` to the requester of `to`.
    ///
    /// `source_url` is the link the requester sent; it is repeated in the
    /// download message for large files.
    pub async fn deliver(
        &self,
        cancel: &CancellationToken,
        to: &MessageRef,
        source_url: &Url,
        artifact: &Path,
        size_bytes: u64,
    ) -> Result<Delivery, DeliveryError> {
        if self.is_inline(size_bytes) {
            debug!(
                chat_id = to.chat_id,
                file_size = size_bytes,
                "Sending video inline"
            );

            self.sink
                .reply_video(to, artifact, size_bytes)
                .await
                .map_err(|source| DeliveryError::Inline { size_bytes, source })?;

            return Ok(Delivery::Inline { size_bytes });
        }

        let filename = stored_file_name(artifact);

        debug!(
            chat_id = to.chat_id,
            file_size = size_bytes,
            store = self.store.name(),
            file_name = %filename,
            "Video too large to send inline, uploading"
        );

        let url = self
            .store
            .store(cancel, artifact, &filename)
            .await
            .map_err(|source| DeliveryError::Store { size_bytes, source })?;

        let text = format!(
            "[Your video]({}) is ready for download _\\(the link will expire in a couple of days\\)_:",
            escape_link_target(source_url.as_str())
        );
        let button = format!("🚀 Download video ({:.2} MB)", size_mb(size_bytes));

        self.sink
            .reply_link(to, &text, &button, &url)
            .await
            .map_err(|source| DeliveryError::Link { size_bytes, source })?;

        info!(
            chat_id = to.chat_id,
            file_size = size_bytes,
            url = %url,
            "Download link sent"
        );

        Ok(Delivery::Link { url, size_bytes })
    }
}

/// `video.<ext>`, keeping the artifact's extension.
fn stored_file_name(artifact: &Path) -> String {
    match artifact.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("video.{}", ext),
        None => "video".to_string(),
    }
}

/// Escapes the characters MarkdownV2 reserves inside `(...)` of a link.
fn escape_link_target(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len());
    for c in url.chars() {
        if matches!(c, ')' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
