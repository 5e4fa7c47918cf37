//! Types for the chat boundary.

/// Identifies an inbound message and who sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
    pub sender_id: i64,
    /// First name of the sender, used in greetings and logs.
    pub sender_name: String,
}

/// A text message to be handled by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub reference: MessageRef,
    pub text: String,
}

impl InboundMessage {
    pub fn new(reference: MessageRef, text: impl Into<String>) -> Self {
        Self {
            reference,
            text: text.into(),
        }
    }
}

/// Acknowledgement marker shown on the original message.
///
/// At most one marker is present at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// The message did not contain a usable link.
    BadRequest,
    /// The video is being downloaded.
    Downloading,
    /// The video is being sent or uploaded.
    Uploading,
}

impl Marker {
    /// Emoji used as the message reaction.
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::BadRequest => "💩",
            Self::Downloading => "🫡",
            Self::Uploading => "🚀",
        }
    }
}

/// Kind of "in progress" indicator shown in the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    RecordingVideo,
    UploadingVideo,
}

/// How the text of a reply is to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Plain,
    MarkdownV2,
}
