mod pidfile;
mod telegram;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use videodl_core::{
    load_config, load_config_from_env, resolve_executable, stage_cookies_file, validate_config,
    AdmissionGate, Config, FileBinStore, LogFormat, LoggingConfig, MessagePipeline,
    SanitizedConfig, YtDlpDownloader,
};

use pidfile::PidFile;
use telegram::TelegramSink;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Used when `--config` is not given and the file exists.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Parser)]
#[command(
    name = "video-dl-bot",
    version,
    about = "Telegram bot that downloads videos from links and sends them back"
)]
struct Cli {
    /// Path to the TOML configuration file. Without it, `config.toml` is used
    /// when present and the environment otherwise.
    #[arg(long, env = "VIDEODL_CONFIG")]
    config: Option<PathBuf>,

    /// Write the process id to this file while running.
    #[arg(long, env = "VIDEODL_PID_FILE")]
    pid_file: Option<PathBuf>,

    /// Check that the instance recorded in the pid file is alive and exit.
    #[arg(long)]
    healthcheck: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Logging may not be initialized yet.
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.healthcheck {
        init_logging(&LoggingConfig::default());
        return healthcheck(cli.pid_file.as_deref());
    }

    let config = load(cli.config.as_deref())?;
    validate_config(&config).context("Configuration validation failed")?;

    init_logging(&config.logging);

    let sanitized = SanitizedConfig::from(&config);
    info!(
        config = %serde_json::to_string(&sanitized).unwrap_or_default(),
        "Configuration loaded"
    );

    let _pid_file = cli
        .pid_file
        .as_ref()
        .map(|path| PidFile::create(path))
        .transpose()
        .context("Failed to create pid file")?;

    let mut downloader_config = config.downloader.clone();
    downloader_config.ytdlp_path = resolve_executable(&config.downloader.ytdlp_path)
        .context("yt-dlp is not available")?;

    // Kept alive for the whole run; the staged copy is removed on drop.
    let staged_cookies = match &config.downloader.cookies_file {
        Some(path) => {
            let staged = stage_cookies_file(path).context("Failed to stage cookies file")?;
            info!(
                cookies_file = %path.display(),
                staged_path = %staged.path().display(),
                "Using cookies file"
            );
            Some(staged)
        }
        None => {
            warn!("no cookies file provided, some sites may not work without it");
            None
        }
    };
    downloader_config.cookies_file = staged_cookies.as_ref().map(|s| s.path().to_path_buf());

    let shutdown = CancellationToken::new();

    let downloader = YtDlpDownloader::with_system_runner(downloader_config);
    match downloader.version(&shutdown).await {
        Ok(version) => info!(
            ytdlp_path = %downloader.config().ytdlp_path.display(),
            ytdlp_version = %version,
            "Found yt-dlp"
        ),
        Err(e) => warn!(error = %e, "Failed to query yt-dlp version"),
    }

    let bot = telegram::create_bot(&config.bot.token).context("Failed to create Telegram client")?;
    let sink = Arc::new(TelegramSink::new(bot.clone()));
    let store = Arc::new(
        FileBinStore::new(config.delivery.filebin.clone())
            .context("Failed to create file hosting client")?,
    );
    let gate = Arc::new(AdmissionGate::new(
        config.downloader.max_concurrent_downloads,
    ));

    let pipeline = Arc::new(
        MessagePipeline::new(downloader, gate, sink, store, shutdown.clone())
            .with_inline_limit(config.delivery.inline_limit_bytes),
    );

    info!(
        version = VERSION,
        max_concurrent_downloads = config.downloader.max_concurrent_downloads,
        inline_limit_bytes = config.delivery.inline_limit_bytes,
        "starting bot"
    );

    let tracker = TaskTracker::new();
    let mut poller = tokio::spawn(telegram::poll_updates(
        bot,
        Arc::clone(&pipeline),
        tracker.clone(),
        shutdown.clone(),
        config.bot.poll_timeout_secs,
    ));

    tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
        result = &mut poller => {
            result.context("Polling task failed")?;
            bail!("Polling stopped unexpectedly");
        }
    }

    // Stops polling and every in-flight request.
    shutdown.cancel();
    poller.await.context("Polling task failed")?;

    tracker.close();
    tracker.wait().await;

    info!("bot stopped");

    Ok(())
}

/// Loads the configuration from the given file, `config.toml` or the
/// environment, in that order.
fn load(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(Path::new(DEFAULT_CONFIG_PATH))
            .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG_PATH)),
        None => load_config_from_env().context("Failed to load config from environment"),
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_filter()));

    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

fn healthcheck(pid_file: Option<&Path>) -> Result<()> {
    let Some(path) = pid_file else {
        bail!("--pid-file is required for the healthcheck");
    };

    let pid = pidfile::healthcheck(path).context("Healthcheck failed")?;
    info!(pid, "healthcheck successful");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
