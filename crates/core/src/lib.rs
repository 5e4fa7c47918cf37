pub mod admission;
pub mod chat;
pub mod config;
pub mod delivery;
pub mod downloader;
pub mod link;
pub mod pipeline;
pub mod process;
pub mod status;
pub mod store;
pub mod testing;

pub use admission::{AdmissionError, AdmissionGate, AdmissionPermit};
pub use chat::{ActivityKind, ChatError, ChatSink, InboundMessage, Marker, MessageRef, TextFormat};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, LogFormat, LogLevel, LoggingConfig, SanitizedConfig,
};
pub use delivery::{Delivery, DeliveryConfig, DeliveryError, DeliveryRouter};
pub use downloader::{
    resolve_executable, stage_cookies_file, DownloadError, DownloadRequest, DownloadResult,
    DownloaderConfig, StagedCookies, VideoDownloader, YtDlpDownloader,
};
pub use link::{extract_link, LinkError};
pub use pipeline::{Command, FailureKind, MessagePipeline, PipelineOutcome};
pub use process::{ProcessError, ProcessInvocation, ProcessOutcome, ProcessRunner, SystemRunner};
pub use status::{ActivitySignal, StatusReporter};
pub use store::{DurableStore, FileBinConfig, FileBinStore, StoreError};
