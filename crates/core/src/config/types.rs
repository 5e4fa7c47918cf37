use serde::{Deserialize, Serialize};

use crate::delivery::DeliveryConfig;
use crate::downloader::DownloaderConfig;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub downloader: DownloaderConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Telegram bot token.
    pub token: String,
    /// Long polling timeout in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u32,
}

fn default_poll_timeout() -> u32 {
    10
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    #[serde(alias = "console")]
    Text,
    Json,
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub bot: SanitizedBotConfig,
    pub downloader: DownloaderConfig,
    pub delivery: DeliveryConfig,
    pub logging: LoggingConfig,
}

/// Sanitized bot config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedBotConfig {
    pub token_configured: bool,
    pub poll_timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            bot: SanitizedBotConfig {
                token_configured: !config.bot.token.is_empty(),
                poll_timeout_secs: config.bot.poll_timeout_secs,
            },
            downloader: config.downloader.clone(),
            delivery: config.delivery.clone(),
            logging: config.logging.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[bot]
token = "12345678:AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bot.poll_timeout_secs, 10);
        assert_eq!(config.downloader.max_concurrent_downloads, 5);
        assert_eq!(config.delivery.inline_limit_bytes, 50 * 1024 * 1024);
        assert_eq!(config.delivery.filebin.base_url, "https://filebin.net");
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[bot]
token = "12345678:AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"
poll_timeout_secs = 30

[downloader]
ytdlp_path = "/usr/local/bin/yt-dlp"
cookies_file = "/secrets/cookies.txt"
js_runtimes = "deno"
max_concurrent_downloads = 3

[delivery]
inline_limit_bytes = 1048576

[delivery.filebin]
base_url = "http://localhost:8080"

[logging]
level = "debug"
format = "json"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bot.poll_timeout_secs, 30);
        assert_eq!(
            config.downloader.ytdlp_path,
            PathBuf::from("/usr/local/bin/yt-dlp")
        );
        assert_eq!(config.downloader.max_concurrent_downloads, 3);
        assert_eq!(config.delivery.inline_limit_bytes, 1024 * 1024);
        assert_eq!(config.delivery.filebin.base_url, "http://localhost:8080");
        assert_eq!(config.delivery.filebin.timeout_secs, 3600);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_console_is_alias_for_text() {
        let logging: LoggingConfig = toml::from_str(r#"format = "console""#).unwrap();
        assert_eq!(logging.format, LogFormat::Text);
    }

    #[test]
    fn test_deserialize_missing_bot_fails() {
        let result: Result<Config, _> = toml::from_str("[logging]\nlevel = \"info\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config() {
        let config: Config = toml::from_str(
            r#"
[bot]
token = "12345678:secretsecretsecretsecretsecretsecret"
"#,
        )
        .unwrap();

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.bot.token_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
    }
}
