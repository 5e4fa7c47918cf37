//! Mock chat sink for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

use crate::chat::{ActivityKind, ChatError, ChatSink, Marker, MessageRef, TextFormat};

/// Kind of outbound call, used to configure failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatCallKind {
    Text,
    Video,
    Link,
    Marker,
    Activity,
}

/// A recorded outbound call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCall {
    Text {
        to: MessageRef,
        text: String,
        format: TextFormat,
    },
    Video {
        to: MessageRef,
        path: PathBuf,
        size_bytes: u64,
    },
    Link {
        to: MessageRef,
        text: String,
        button_text: String,
        url: Url,
    },
    Marker {
        to: MessageRef,
        marker: Option<Marker>,
    },
    Activity {
        chat_id: i64,
        kind: ActivityKind,
    },
}

impl ChatCall {
    pub fn kind(&self) -> ChatCallKind {
        match self {
            Self::Text { .. } => ChatCallKind::Text,
            Self::Video { .. } => ChatCallKind::Video,
            Self::Link { .. } => ChatCallKind::Link,
            Self::Marker { .. } => ChatCallKind::Marker,
            Self::Activity { .. } => ChatCallKind::Activity,
        }
    }
}

/// Mock implementation of the ChatSink trait.
///
/// Records every call, failed ones included. Failures can be injected once
/// ([`set_next_error`](Self::set_next_error)) or permanently for one kind of
/// call ([`set_failing`](Self::set_failing)).
///
/// # Example
///
/// ```rust,ignore
/// use videodl_core::testing::{ChatCallKind, MockChatSink};
///
/// let sink = MockChatSink::new();
/// sink.set_failing(ChatCallKind::Video).await;
///
/// // ... run the pipeline ...
///
/// let texts = sink.texts().await;
/// assert!(texts[0].starts_with("❌ Failed to send video"));
/// ```
#[derive(Debug, Clone)]
pub struct MockChatSink {
    /// Recorded calls.
    calls: Arc<RwLock<Vec<ChatCall>>>,
    /// If set, the next call of any kind will fail with this error.
    next_error: Arc<RwLock<Option<ChatError>>>,
    /// Kinds of calls that always fail.
    failing: Arc<RwLock<HashSet<ChatCallKind>>>,
}

impl Default for MockChatSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChatSink {
    /// Create a new mock sink where every call succeeds.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failing: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<ChatCall> {
        self.calls.read().await.clone()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    /// Texts of all text replies, in order.
    pub async fn texts(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                ChatCall::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Marker changes, in order. `None` entries are clears.
    pub async fn markers(&self) -> Vec<Option<Marker>> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                ChatCall::Marker { marker, .. } => Some(*marker),
                _ => None,
            })
            .collect()
    }

    /// Number of activity notifications of the given kind.
    pub async fn activity_count(&self, kind: ActivityKind) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| matches!(call, ChatCall::Activity { kind: k, .. } if *k == kind))
            .count()
    }

    /// Number of calls of the given kind.
    pub async fn count(&self, kind: ChatCallKind) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| call.kind() == kind)
            .count()
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: ChatError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every call of the given kind fail.
    pub async fn set_failing(&self, kind: ChatCallKind) {
        self.failing.write().await.insert(kind);
    }

    async fn record(&self, call: ChatCall) -> Result<(), ChatError> {
        let kind = call.kind();
        self.calls.write().await.push(call);

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        if self.failing.read().await.contains(&kind) {
            return Err(ChatError::Api(format!("mock {:?} failure", kind)));
        }

        Ok(())
    }
}

#[async_trait]
impl ChatSink for MockChatSink {
    async fn reply_text(
        &self,
        to: &MessageRef,
        text: &str,
        format: TextFormat,
    ) -> Result<(), ChatError> {
        self.record(ChatCall::Text {
            to: to.clone(),
            text: text.to_string(),
            format,
        })
        .await
    }

    async fn reply_video(
        &self,
        to: &MessageRef,
        path: &Path,
        size_bytes: u64,
    ) -> Result<(), ChatError> {
        self.record(ChatCall::Video {
            to: to.clone(),
            path: path.to_path_buf(),
            size_bytes,
        })
        .await
    }

    async fn reply_link(
        &self,
        to: &MessageRef,
        text: &str,
        button_text: &str,
        url: &Url,
    ) -> Result<(), ChatError> {
        self.record(ChatCall::Link {
            to: to.clone(),
            text: text.to_string(),
            button_text: button_text.to_string(),
            url: url.clone(),
        })
        .await
    }

    async fn set_marker(&self, to: &MessageRef, marker: Option<Marker>) -> Result<(), ChatError> {
        self.record(ChatCall::Marker {
            to: to.clone(),
            marker,
        })
        .await
    }

    async fn send_activity(&self, chat_id: i64, kind: ActivityKind) -> Result<(), ChatError> {
        self.record(ChatCall::Activity { chat_id, kind }).await
    }
}
