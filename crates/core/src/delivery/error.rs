//! Error types for the delivery module.

use thiserror::Error;

use crate::chat::ChatError;
use crate::store::StoreError;

/// Errors that can occur while handing an artifact to the requester.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Sending the attachment failed.
    #[error("Failed to send video inline: {source}")]
    Inline {
        size_bytes: u64,
        #[source]
        source: ChatError,
    },

    /// Uploading to the durable store failed.
    #[error("Failed to upload video to store: {source}")]
    Store {
        size_bytes: u64,
        #[source]
        source: StoreError,
    },

    /// The upload worked but the link message could not be sent.
    #[error("Failed to send download link: {source}")]
    Link {
        size_bytes: u64,
        #[source]
        source: ChatError,
    },
}

impl DeliveryError {
    /// Size of the artifact that failed to be delivered.
    pub fn size_bytes(&self) -> u64 {
        match self {
            Self::Inline { size_bytes, .. }
            | Self::Store { size_bytes, .. }
            | Self::Link { size_bytes, .. } => *size_bytes,
        }
    }

    /// Whether the error was caused by cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Store {
                source: StoreError::Cancelled,
                ..
            }
        )
    }
}
