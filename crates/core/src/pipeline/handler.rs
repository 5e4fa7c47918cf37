//! Message pipeline implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::admission::AdmissionGate;
use crate::chat::{ActivityKind, ChatSink, InboundMessage, Marker, MessageRef, TextFormat};
use crate::delivery::{size_mb, DeliveryError, DeliveryRouter};
use crate::downloader::VideoDownloader;
use crate::link::extract_link;
use crate::status::StatusReporter;
use crate::store::DurableStore;

use super::messages;
use super::types::{Command, FailureKind, PipelineOutcome};

/// Handles inbound messages end to end.
///
/// One instance is shared by all concurrently handled messages. Each call to
/// [`handle`](Self::handle) runs in its own child scope of the shutdown
/// token, so cancelling that token stops every in-flight request.
pub struct MessagePipeline<D: VideoDownloader> {
    downloader: D,
    gate: Arc<AdmissionGate>,
    sink: Arc<dyn ChatSink>,
    router: DeliveryRouter,
    shutdown: CancellationToken,
}

/// Deletes the downloaded file when dropped.
struct DownloadedFile(PathBuf);

impl DownloadedFile {
    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for DownloadedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.0) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(file_path = %self.0.display(), error = %e, "Failed to remove downloaded file");
            }
        }
    }
}

impl<D: VideoDownloader> MessagePipeline<D> {
    /// Creates a new pipeline.
    pub fn new(
        downloader: D,
        gate: Arc<AdmissionGate>,
        sink: Arc<dyn ChatSink>,
        store: Arc<dyn DurableStore>,
        shutdown: CancellationToken,
    ) -> Self {
        let router = DeliveryRouter::new(Arc::clone(&sink), store);

        Self {
            downloader,
            gate,
            sink,
            router,
            shutdown,
        }
    }

    /// Sets the largest size sent inline.
    pub fn with_inline_limit(mut self, bytes: u64) -> Self {
        self.router = self.router.with_inline_limit(bytes);
        self
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    /// Handles one inbound message. Never fails; see [`PipelineOutcome`].
    pub async fn handle(&self, message: InboundMessage) -> PipelineOutcome {
        let from = &message.reference;

        if let Some(command) = Command::parse(&message.text) {
            self.handle_command(from, command).await;
            return PipelineOutcome::Answered(command);
        }

        let cancel = self.shutdown.child_token();
        let status = StatusReporter::new(Arc::clone(&self.sink), from.clone());

        let url = match extract_link(&message.text) {
            Ok(url) => url,
            Err(e) => {
                status.mark(Marker::BadRequest).await;

                info!(
                    sender_name = %from.sender_name,
                    sender_id = from.sender_id,
                    message_text = %message.text,
                    reason = %e,
                    "Received invalid link from user"
                );

                self.reply(from, messages::INVALID_LINK_MD2, TextFormat::MarkdownV2)
                    .await;
                return PipelineOutcome::InvalidLink;
            }
        };

        info!(
            sender_name = %from.sender_name,
            sender_id = from.sender_id,
            video_url = %url,
            "Received video download request"
        );

        // Held until the end of this function, whichever way it ends.
        let _permit = match self.gate.acquire(&cancel).await {
            Ok(permit) => permit,
            Err(e) => {
                debug!(sender_id = from.sender_id, video_url = %url, reason = %e, "Admission aborted");
                return PipelineOutcome::Cancelled;
            }
        };

        let outcome = self.process(&cancel, from, &status, &url).await;

        status.clear_marker().await;

        outcome
    }

    /// Answers a bot command.
    pub async fn handle_command(&self, from: &MessageRef, command: Command) {
        debug!(sender_id = from.sender_id, ?command, "Answering command");

        match command {
            Command::Start => {
                let text = messages::greeting(&from.sender_name);
                self.reply(from, &text, TextFormat::Plain).await;
            }
            Command::Test => {
                self.reply(from, messages::TEST_REPLY, TextFormat::Plain)
                    .await;
            }
        }
    }

    /// Download and delivery. Runs while holding an admission slot.
    async fn process(
        &self,
        cancel: &CancellationToken,
        from: &MessageRef,
        status: &StatusReporter,
        url: &Url,
    ) -> PipelineOutcome {
        status.mark(Marker::Downloading).await;
        let downloading = status.begin_activity(ActivityKind::RecordingVideo, cancel);

        let request = self.downloader.request(url.clone());
        let result = match self.downloader.download(cancel, &request).await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => return PipelineOutcome::Cancelled,
            Err(e) => {
                if e.is_contract_violation() {
                    error!(
                        error = %e,
                        downloader = self.downloader.name(),
                        sender_name = %from.sender_name,
                        sender_id = from.sender_id,
                        video_url = %url,
                        "Downloader output does not match the expected contract"
                    );
                } else {
                    error!(
                        error = %e,
                        sender_name = %from.sender_name,
                        sender_id = from.sender_id,
                        video_url = %url,
                        "Failed to download video"
                    );
                }

                self.reply(from, messages::DOWNLOAD_FAILED, TextFormat::Plain)
                    .await;
                return PipelineOutcome::Failed(FailureKind::Download);
            }
        };

        downloading.stop();

        let file = DownloadedFile(result.file_path);

        let size_bytes = match tokio::fs::metadata(file.path()).await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                error!(
                    error = %e,
                    file_path = %file.path().display(),
                    sender_name = %from.sender_name,
                    sender_id = from.sender_id,
                    video_url = %url,
                    "Failed to stat downloaded video file"
                );

                self.reply(from, messages::FILE_UNAVAILABLE, TextFormat::Plain)
                    .await;
                return PipelineOutcome::Failed(FailureKind::FileUnavailable);
            }
        };

        debug!(
            file_path = %file.path().display(),
            sender_name = %from.sender_name,
            sender_id = from.sender_id,
            video_url = %url,
            file_size = size_bytes,
            "Successfully downloaded video"
        );

        status.mark(Marker::Uploading).await;
        let uploading = status.begin_activity(ActivityKind::UploadingVideo, cancel);

        let delivered = self
            .router
            .deliver(cancel, from, url, file.path(), size_bytes)
            .await;

        uploading.stop();

        match delivered {
            Ok(delivery) => PipelineOutcome::Delivered(delivery),
            Err(e) if e.is_cancelled() => PipelineOutcome::Cancelled,
            Err(e) => {
                error!(
                    error = %e,
                    file_size = e.size_bytes(),
                    sender_name = %from.sender_name,
                    sender_id = from.sender_id,
                    video_url = %url,
                    "Failed to deliver video"
                );

                match e {
                    DeliveryError::Inline { source, .. } => {
                        let text = messages::inline_failed(size_mb(size_bytes), &source.to_string());
                        self.reply(from, &text, TextFormat::Plain).await;
                        PipelineOutcome::Failed(FailureKind::InlineSend)
                    }
                    DeliveryError::Store { .. } => {
                        self.reply(from, messages::UPLOAD_FAILED, TextFormat::Plain)
                            .await;
                        PipelineOutcome::Failed(FailureKind::Upload)
                    }
                    DeliveryError::Link { .. } => PipelineOutcome::Failed(FailureKind::LinkSend),
                }
            }
        }
    }

    async fn reply(&self, to: &MessageRef, text: &str, format: TextFormat) {
        if let Err(e) = self.sink.reply_text(to, text, format).await {
            warn!(
                chat_id = to.chat_id,
                sender_id = to.sender_id,
                error = %e,
                "Failed to send reply"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::Delivery;
    use crate::downloader::{DownloaderConfig, YtDlpDownloader};
    use crate::process::ProcessError;
    use crate::testing::{
        ChatCall, ChatCallKind, MockChatSink, MockProcessRunner, MockStore, SimulatedDownload,
    };
    use std::time::Duration;
    use tempfile::TempDir;

    struct Harness {
        _temp: TempDir,
        temp_path: PathBuf,
        runner: MockProcessRunner,
        sink: MockChatSink,
        store: MockStore,
        shutdown: CancellationToken,
        pipeline: MessagePipeline<YtDlpDownloader<MockProcessRunner>>,
    }

    fn harness(capacity: usize) -> Harness {
        let temp = TempDir::new().unwrap();
        let runner = MockProcessRunner::new();
        let sink = MockChatSink::new();
        let store = MockStore::new();
        let shutdown = CancellationToken::new();

        let downloader = YtDlpDownloader::new(
            DownloaderConfig::default().with_temp_dir(temp.path()),
            runner.clone(),
        );
        let pipeline = MessagePipeline::new(
            downloader,
            Arc::new(AdmissionGate::new(capacity)),
            Arc::new(sink.clone()),
            Arc::new(store.clone()),
            shutdown.clone(),
        );

        Harness {
            temp_path: temp.path().to_path_buf(),
            _temp: temp,
            runner,
            sink,
            store,
            shutdown,
            pipeline,
        }
    }

    fn message(text: &str) -> InboundMessage {
        InboundMessage::new(
            MessageRef {
                chat_id: 100,
                message_id: 5,
                sender_id: 200,
                sender_name: "Robin".to_string(),
            },
            text,
        )
    }

    fn leftover_files(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_invalid_link() {
        let h = harness(2);

        let outcome = h.pipeline.handle(message("hello there")).await;

        assert_eq!(outcome, PipelineOutcome::InvalidLink);
        assert_eq!(h.sink.markers().await, vec![Some(Marker::BadRequest)]);

        let calls = h.sink.recorded_calls().await;
        assert!(matches!(
            calls.last(),
            Some(ChatCall::Text {
                format: TextFormat::MarkdownV2,
                ..
            })
        ));
        assert_eq!(h.runner.invocation_count().await, 0);
    }

    #[tokio::test]
    async fn test_commands() {
        let h = harness(2);

        assert_eq!(
            h.pipeline.handle(message("/start")).await,
            PipelineOutcome::Answered(Command::Start)
        );
        assert_eq!(
            h.pipeline.handle(message("test")).await,
            PipelineOutcome::Answered(Command::Test)
        );

        let texts = h.sink.texts().await;
        assert!(texts[0].starts_with("Hello Robin!"));
        assert!(texts[1].starts_with("Just send me a video URL"));
        assert!(h.sink.markers().await.is_empty());
    }

    #[tokio::test]
    async fn test_inline_delivery_with_markers() {
        let h = harness(2);
        h.runner
            .set_simulation(SimulatedDownload::video("mp4", 1024 * 1024))
            .await;

        let outcome = h
            .pipeline
            .handle(message("https://example.com/v/1"))
            .await;

        assert_eq!(
            outcome,
            PipelineOutcome::Delivered(Delivery::Inline {
                size_bytes: 1024 * 1024
            })
        );
        assert_eq!(
            h.sink.markers().await,
            vec![Some(Marker::Downloading), Some(Marker::Uploading), None]
        );
        assert!(h.sink.activity_count(ActivityKind::RecordingVideo).await >= 1);
        assert_eq!(h.pipeline.gate().occupied(), 0);
        assert_eq!(leftover_files(&h.temp_path), 0);
    }

    #[tokio::test]
    async fn test_large_file_goes_through_store() {
        let h = harness(2);
        h.runner
            .set_simulation(SimulatedDownload::video("webm", 2048))
            .await;
        let pipeline = h.pipeline.with_inline_limit(1024);

        let outcome = pipeline.handle(message("youtu.be/abc")).await;

        match outcome {
            PipelineOutcome::Delivered(Delivery::Link { url, size_bytes }) => {
                assert_eq!(size_bytes, 2048);
                assert_eq!(url.as_str(), "https://store.invalid/1/video.webm");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(h.store.upload_count().await, 1);
        assert_eq!(h.sink.count(ChatCallKind::Link).await, 1);
        assert_eq!(leftover_files(&h.temp_path), 0);
    }

    #[tokio::test]
    async fn test_download_failure() {
        let h = harness(2);
        h.runner
            .set_next_error(ProcessError::Failed {
                message: "exit status: 1: ERROR: Unsupported URL".to_string(),
                exit_code: Some(1),
            })
            .await;

        let outcome = h.pipeline.handle(message("https://example.com/v/1")).await;

        assert_eq!(outcome, PipelineOutcome::Failed(FailureKind::Download));
        assert_eq!(h.sink.texts().await, vec!["❌ Failed to download video"]);
        assert_eq!(
            h.sink.markers().await,
            vec![Some(Marker::Downloading), None]
        );
        assert_eq!(h.pipeline.gate().occupied(), 0);
    }

    #[tokio::test]
    async fn test_contract_violation_is_reported_as_download_failure() {
        let h = harness(2);
        h.runner.set_simulation(SimulatedDownload::NoOutput).await;

        let outcome = h.pipeline.handle(message("https://example.com/v/1")).await;

        assert_eq!(outcome, PipelineOutcome::Failed(FailureKind::Download));
        assert_eq!(h.sink.texts().await, vec!["❌ Failed to download video"]);
        assert_eq!(leftover_files(&h.temp_path), 0);
    }

    #[tokio::test]
    async fn test_inline_failure_reports_size() {
        let h = harness(2);
        h.runner
            .set_simulation(SimulatedDownload::video("mp4", 3 * 1024 * 1024))
            .await;
        h.sink.set_failing(ChatCallKind::Video).await;

        let outcome = h.pipeline.handle(message("https://example.com/v/1")).await;

        assert_eq!(outcome, PipelineOutcome::Failed(FailureKind::InlineSend));
        let texts = h.sink.texts().await;
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("❌ Failed to send video (3.00 MB): "));
        assert_eq!(leftover_files(&h.temp_path), 0);
    }

    #[tokio::test]
    async fn test_upload_failure() {
        let h = harness(2);
        h.runner
            .set_simulation(SimulatedDownload::video("mp4", 4096))
            .await;
        h.store
            .set_next_error(crate::store::StoreError::unexpected_status(
                crate::store::StoreStage::Upload,
                500,
                "",
            ))
            .await;
        let pipeline = h.pipeline.with_inline_limit(1);

        let outcome = pipeline.handle(message("https://example.com/v/1")).await;

        assert_eq!(outcome, PipelineOutcome::Failed(FailureKind::Upload));
        assert_eq!(
            h.sink.texts().await,
            vec!["❌ Failed to upload video to file hosting"]
        );
        assert_eq!(leftover_files(&h.temp_path), 0);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_in_flight_download() {
        let h = harness(2);
        h.runner.set_delay(Duration::from_secs(30)).await;

        let shutdown = h.shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            shutdown.cancel();
        });

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            h.pipeline.handle(message("https://example.com/v/1")),
        )
        .await
        .expect("pipeline should stop after shutdown");

        assert_eq!(outcome, PipelineOutcome::Cancelled);
        assert_eq!(h.pipeline.gate().occupied(), 0);
        assert!(h.sink.texts().await.is_empty());
        assert_eq!(h.sink.markers().await.last(), Some(&None));
        assert_eq!(leftover_files(&h.temp_path), 0);
    }
}
