//! Boundary towards the chat platform.
//!
//! The core never talks to a chat service directly. Everything it needs to
//! tell the requester goes through a [`ChatSink`]; the binary provides the
//! Telegram implementation and tests use
//! [`MockChatSink`](crate::testing::MockChatSink).

mod error;
mod traits;
mod types;

pub use error::ChatError;
pub use traits::ChatSink;
pub use types::{ActivityKind, InboundMessage, Marker, MessageRef, TextFormat};
