//! Telegram transport.
//!
//! [`TelegramSink`] implements the core [`ChatSink`] on top of the Bot API and
//! [`poll_updates`] feeds inbound text messages into the pipeline.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use teloxide::payloads::setters::*;
use teloxide::requests::{Request, Requester};
use teloxide::types::{
    ChatAction, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, LinkPreviewOptions,
    MediaKind, Message, MessageId, MessageKind, ParseMode, ReactionType, ReplyParameters,
    UpdateKind,
};
use teloxide::{Bot, RequestError};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};
use url::Url;

use videodl_core::{
    ActivityKind, ChatError, ChatSink, InboundMessage, Marker, MessagePipeline, MessageRef,
    TextFormat, VideoDownloader,
};

/// Delay before polling again after a failed `getUpdates`.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Upper bound for a single Bot API request, video uploads included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Creates the Bot API client.
pub fn create_bot(token: &str) -> Result<Bot, reqwest::Error> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    Ok(Bot::with_client(token, client))
}

/// Bot API implementation of [`ChatSink`].
#[derive(Clone)]
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Sends the request as a reply to `to`. When that fails, for example
    /// because the original message was deleted, sends it to the sender as a
    /// fresh message.
    async fn reply_or_send<R, F>(&self, to: &MessageRef, build: F) -> Result<(), ChatError>
    where
        R: Request<Err = RequestError> + Send,
        F: Fn(ChatId, Option<ReplyParameters>) -> R + Send + Sync,
    {
        let reply = ReplyParameters::new(MessageId(to.message_id));

        match build(ChatId(to.chat_id), Some(reply)).send().await {
            Ok(_) => Ok(()),
            Err(e) => {
                debug!(
                    chat_id = to.chat_id,
                    message_id = to.message_id,
                    error = %e,
                    "Reply failed, sending a new message"
                );

                build(ChatId(to.sender_id), None)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(chat_error)
            }
        }
    }
}

fn chat_error(e: RequestError) -> ChatError {
    match e {
        RequestError::Network(e) => ChatError::Network(e.to_string()),
        RequestError::Io(e) => ChatError::File(e.to_string()),
        other => ChatError::Api(other.to_string()),
    }
}

fn chat_action(kind: ActivityKind) -> ChatAction {
    match kind {
        ActivityKind::RecordingVideo => ChatAction::RecordVideo,
        ActivityKind::UploadingVideo => ChatAction::UploadVideo,
    }
}

fn disabled_link_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

#[async_trait]
impl ChatSink for TelegramSink {
    async fn reply_text(
        &self,
        to: &MessageRef,
        text: &str,
        format: TextFormat,
    ) -> Result<(), ChatError> {
        self.reply_or_send(to, |chat_id, reply| {
            let mut request = self
                .bot
                .send_message(chat_id, text)
                .link_preview_options(disabled_link_preview());
            if format == TextFormat::MarkdownV2 {
                request = request.parse_mode(ParseMode::MarkdownV2);
            }
            if let Some(reply) = reply {
                request = request.reply_parameters(reply);
            }
            request
        })
        .await
    }

    async fn reply_video(
        &self,
        to: &MessageRef,
        path: &Path,
        size_bytes: u64,
    ) -> Result<(), ChatError> {
        debug!(
            chat_id = to.chat_id,
            file_path = %path.display(),
            file_size = size_bytes,
            "Uploading video to chat"
        );

        self.reply_or_send(to, |chat_id, reply| {
            let mut request = self
                .bot
                .send_video(chat_id, InputFile::file(path.to_path_buf()))
                .supports_streaming(true);
            if let Some(reply) = reply {
                request = request.reply_parameters(reply);
            }
            request
        })
        .await
    }

    async fn reply_link(
        &self,
        to: &MessageRef,
        text: &str,
        button_text: &str,
        url: &Url,
    ) -> Result<(), ChatError> {
        let markup = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
            button_text.to_string(),
            url.clone(),
        )]]);

        self.reply_or_send(to, |chat_id, reply| {
            let mut request = self
                .bot
                .send_message(chat_id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .link_preview_options(disabled_link_preview())
                .reply_markup(markup.clone());
            if let Some(reply) = reply {
                request = request.reply_parameters(reply);
            }
            request
        })
        .await
    }

    async fn set_marker(&self, to: &MessageRef, marker: Option<Marker>) -> Result<(), ChatError> {
        let reaction = marker
            .map(|m| {
                vec![ReactionType::Emoji {
                    emoji: m.emoji().to_string(),
                }]
            })
            .unwrap_or_default();

        self.bot
            .set_message_reaction(ChatId(to.chat_id), MessageId(to.message_id))
            .reaction(reaction)
            .send()
            .await
            .map(|_| ())
            .map_err(chat_error)
    }

    async fn send_activity(&self, chat_id: i64, kind: ActivityKind) -> Result<(), ChatError> {
        self.bot
            .send_chat_action(ChatId(chat_id), chat_action(kind))
            .send()
            .await
            .map(|_| ())
            .map_err(chat_error)
    }
}

/// Text message (plain, forwarded or reply) with a known sender.
pub fn inbound_message(message: &Message) -> Option<InboundMessage> {
    let text = match &message.kind {
        MessageKind::Common(common) => match &common.media_kind {
            MediaKind::Text(text) => text.text.clone(),
            _ => return None,
        },
        _ => return None,
    };

    let from = message.from.as_ref()?;

    Some(InboundMessage::new(
        MessageRef {
            chat_id: message.chat.id.0,
            message_id: message.id.0,
            sender_id: from.id.0 as i64,
            sender_name: from.first_name.clone(),
        },
        text,
    ))
}

/// Long polls the Bot API until `shutdown` is cancelled.
///
/// Every message is handled on its own task tracked by `tracker`; the caller
/// waits on the tracker to drain in-flight requests.
pub async fn poll_updates<D>(
    bot: Bot,
    pipeline: Arc<MessagePipeline<D>>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
    timeout_secs: u32,
) where
    D: VideoDownloader + 'static,
{
    let mut offset = 0i32;

    info!(timeout_secs, "Polling for updates");

    loop {
        let result = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = bot.get_updates().offset(offset).timeout(timeout_secs).send() => result,
        };

        let updates = match result {
            Ok(updates) => updates,
            Err(e) => {
                error!(error = %e, retry_in_secs = POLL_RETRY_DELAY.as_secs(), "Telegram client error");

                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(POLL_RETRY_DELAY) => continue,
                }
            }
        };

        for update in updates {
            offset = update.id.as_offset() as i32;

            let UpdateKind::Message(message) = &update.kind else {
                continue;
            };

            let Some(inbound) = inbound_message(message) else {
                debug!(chat_id = message.chat.id.0, "Ignoring non-text message");
                continue;
            };

            let pipeline = Arc::clone(&pipeline);
            tracker.spawn(async move {
                let outcome = pipeline.handle(inbound).await;
                debug!(?outcome, "Message handled");
            });
        }
    }

    if !tracker.is_empty() {
        info!(in_flight = tracker.len(), "Waiting for in-flight requests");
    }
}
