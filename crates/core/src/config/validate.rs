use once_cell::sync::Lazy;
use regex_lite::Regex;
use url::Url;

use crate::admission::MAX_CAPACITY;

use super::{types::Config, ConfigError};

static BOT_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{8,10}:[a-zA-Z0-9_-]{35}$").expect("bot token regex is valid")
});

/// Validate configuration
/// Currently validates:
/// - Bot token is present and well formed
/// - Concurrent download limit is within 1..=100
/// - Cookies file, when set, is an existing file
/// - Inline limit is not 0
/// - Filebin base URL is an http(s) URL
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::ValidationError(msg)) };

    // Bot validation
    let token = config.bot.token.trim();
    if token.is_empty() {
        return invalid("bot.token is required".to_string());
    }
    if !(10..=100).contains(&token.len()) {
        return invalid("bot.token must be between 10 and 100 characters long".to_string());
    }
    if !BOT_TOKEN_RE.is_match(token) {
        return invalid("bot.token has an invalid format".to_string());
    }

    // Downloader validation
    let max = config.downloader.max_concurrent_downloads;
    if !(1..=MAX_CAPACITY).contains(&max) {
        return invalid(format!(
            "downloader.max_concurrent_downloads must be between 1 and {}, got {}",
            MAX_CAPACITY, max
        ));
    }

    if let Some(cookies) = &config.downloader.cookies_file {
        match std::fs::metadata(cookies) {
            Ok(meta) if meta.is_dir() => {
                return invalid(format!(
                    "downloader.cookies_file cannot be a directory: {}",
                    cookies.display()
                ));
            }
            Ok(_) => {}
            Err(e) => {
                return invalid(format!(
                    "downloader.cookies_file is not accessible ({}): {}",
                    cookies.display(),
                    e
                ));
            }
        }
    }

    // Delivery validation
    if config.delivery.inline_limit_bytes == 0 {
        return invalid("delivery.inline_limit_bytes cannot be 0".to_string());
    }

    let base_url = &config.delivery.filebin.base_url;
    match Url::parse(base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => {
            return invalid(format!(
                "delivery.filebin.base_url must be an http(s) URL, got {:?}",
                base_url
            ));
        }
    }

    Ok(())
}
