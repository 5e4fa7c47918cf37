//! Configuration for the filebin store.

use serde::{Deserialize, Serialize};

/// Connection settings for a filebin instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileBinConfig {
    /// Base URL of the filebin instance.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds. Large uploads take a while.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://filebin.net".to_string()
}

fn default_timeout_secs() -> u64 {
    60 * 60
}

impl Default for FileBinConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FileBinConfig {
    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
