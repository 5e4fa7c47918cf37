//! Types for the pipeline module.

use crate::delivery::Delivery;

/// Bot commands answered without downloading anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/start`, sent by clients when a chat with the bot is opened.
    Start,
    /// A plain `test` message.
    Test,
}

impl Command {
    /// Recognizes a command message.
    ///
    /// `/start` may carry a `@botname` suffix and a payload. `test` must be
    /// the whole message.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if text == "test" {
            return Some(Self::Test);
        }

        let first = text.split_whitespace().next()?;
        let name = first.split('@').next().unwrap_or(first);

        (name == "/start").then_some(Self::Start)
    }
}

/// Why a request failed after its link was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The extraction tool failed or broke its output contract.
    Download,
    /// The downloaded file could not be inspected.
    FileUnavailable,
    /// Sending the attachment failed.
    InlineSend,
    /// Uploading to the durable store failed.
    Upload,
    /// The upload worked but the link message could not be sent.
    LinkSend,
}

/// Result of handling one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// A bot command was answered.
    Answered(Command),
    /// The message had no usable link.
    InvalidLink,
    /// The video reached the requester.
    Delivered(Delivery),
    /// Something went wrong; the requester was told.
    Failed(FailureKind),
    /// The cancellation scope ended before the request finished.
    Cancelled,
}
