//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every collaborator trait,
//! allowing the whole pipeline to run without yt-dlp, Telegram or filebin.
//!
//! # Example
//!
//! ```rust,ignore
//! use videodl_core::testing::{MockChatSink, MockProcessRunner, MockStore, SimulatedDownload};
//!
//! let runner = MockProcessRunner::new();
//! let sink = MockChatSink::new();
//! let store = MockStore::new();
//!
//! // Configure what the "download" produces
//! runner.set_simulation(SimulatedDownload::video("mp4", 10 * 1024 * 1024)).await;
//!
//! // Build a MessagePipeline with these...
//! ```

mod mock_chat_sink;
mod mock_process_runner;
mod mock_store;

pub use mock_chat_sink::{ChatCall, ChatCallKind, MockChatSink};
pub use mock_process_runner::{MockProcessRunner, SimulatedDownload};
pub use mock_store::{MockStore, RecordedUpload};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::chat::{InboundMessage, MessageRef};

    /// Create a message reference with reasonable defaults.
    pub fn message_ref(chat_id: i64, message_id: i32) -> MessageRef {
        MessageRef {
            chat_id,
            message_id,
            sender_id: chat_id,
            sender_name: "Tester".to_string(),
        }
    }

    /// Create an inbound text message in chat `1`.
    pub fn inbound(text: &str) -> InboundMessage {
        InboundMessage::new(message_ref(1, 1), text)
    }
}
