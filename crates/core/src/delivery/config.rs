//! Configuration for the delivery module.

use serde::{Deserialize, Serialize};

use crate::store::FileBinConfig;

/// Largest artifact sent inline, in bytes.
pub const DEFAULT_INLINE_LIMIT: u64 = 50 * 1024 * 1024;

/// Delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Artifacts up to this size are sent as attachments.
    #[serde(default = "default_inline_limit")]
    pub inline_limit_bytes: u64,

    /// Store used for larger artifacts.
    #[serde(default)]
    pub filebin: FileBinConfig,
}

fn default_inline_limit() -> u64 {
    DEFAULT_INLINE_LIMIT
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            inline_limit_bytes: default_inline_limit(),
            filebin: FileBinConfig::default(),
        }
    }
}
