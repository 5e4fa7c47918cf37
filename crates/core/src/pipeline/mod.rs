//! Per-message handling flow.
//!
//! [`MessagePipeline`] ties every other component together. For each inbound
//! message it:
//!
//! 1. answers bot commands (`/start`, `test`) directly,
//! 2. extracts a link, or marks the message as a bad request and explains
//!    what a valid link looks like,
//! 3. waits for a slot in the shared [`AdmissionGate`](crate::admission::AdmissionGate),
//! 4. downloads the video while a "recording video" indicator runs,
//! 5. delivers the file inline or through the durable store while an
//!    "uploading video" indicator runs,
//! 6. clears the marker and deletes the downloaded file.
//!
//! Errors never escape [`MessagePipeline::handle`]: each one becomes a
//! [`PipelineOutcome`] plus a reply to the requester where one is due.

mod handler;
mod messages;
mod types;

pub use handler::MessagePipeline;
pub use types::{Command, FailureKind, PipelineOutcome};
