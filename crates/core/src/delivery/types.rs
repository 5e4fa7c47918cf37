//! Types for the delivery module.

use url::Url;

/// How an artifact reached the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Sent as an attachment.
    Inline { size_bytes: u64 },
    /// Uploaded to the durable store and shared as a link.
    Link { url: Url, size_bytes: u64 },
}

impl Delivery {
    pub fn size_bytes(&self) -> u64 {
        match self {
            Self::Inline { size_bytes } | Self::Link { size_bytes, .. } => *size_bytes,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }
}

/// Size in mebibytes, as shown to users.
pub fn size_mb(size_bytes: u64) -> f64 {
    size_bytes as f64 / 1024.0 / 1024.0
}
