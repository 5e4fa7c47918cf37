//! Per-message status reporter.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::chat::{ActivityKind, ChatSink, Marker, MessageRef};

use super::activity::ActivitySignal;

/// Feedback helper bound to one inbound message.
#[derive(Clone)]
pub struct StatusReporter {
    sink: Arc<dyn ChatSink>,
    message: MessageRef,
}

impl StatusReporter {
    pub fn new(sink: Arc<dyn ChatSink>, message: MessageRef) -> Self {
        Self { sink, message }
    }

    /// Replaces the marker on the message.
    pub async fn mark(&self, marker: Marker) {
        if let Err(e) = self.sink.set_marker(&self.message, Some(marker)).await {
            debug!(
                chat_id = self.message.chat_id,
                message_id = self.message.message_id,
                ?marker,
                error = %e,
                "Failed to set marker"
            );
        }
    }

    /// Removes any marker from the message.
    pub async fn clear_marker(&self) {
        if let Err(e) = self.sink.set_marker(&self.message, None).await {
            debug!(
                chat_id = self.message.chat_id,
                message_id = self.message.message_id,
                error = %e,
                "Failed to clear marker"
            );
        }
    }

    /// Starts an activity indicator in the message's chat.
    pub fn begin_activity(&self, kind: ActivityKind, cancel: &CancellationToken) -> ActivitySignal {
        ActivitySignal::start(Arc::clone(&self.sink), self.message.chat_id, kind, cancel)
    }
}
