//! Application configuration.
//!
//! Configuration is read from a TOML file and overridden by environment
//! variables prefixed with `VIDEODL_`, nested keys separated by `__`
//! (for example `VIDEODL_BOT__TOKEN` or
//! `VIDEODL_DOWNLOADER__MAX_CONCURRENT_DOWNLOADS`).

mod loader;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_env, load_config_from_str, ENV_PREFIX};
pub use types::*;
pub use validate::validate_config;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
