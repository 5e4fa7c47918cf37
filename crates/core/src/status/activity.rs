//! Periodic activity indicator.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::chat::{ActivityKind, ChatSink};

/// Re-send interval. Indicators expire after about five seconds.
pub const ACTIVITY_INTERVAL: Duration = Duration::from_millis(4500);

/// A running activity indicator.
///
/// Sends one notification right away and then one per interval until
/// [`stop`](Self::stop) is called, the value is dropped, or the parent
/// cancellation scope ends. The first failed notification ends the loop.
#[derive(Debug)]
pub struct ActivitySignal {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ActivitySignal {
    /// Starts signalling `kind` in `chat_id` at the default interval.
    pub fn start(
        sink: Arc<dyn ChatSink>,
        chat_id: i64,
        kind: ActivityKind,
        parent: &CancellationToken,
    ) -> Self {
        Self::start_with_interval(sink, chat_id, kind, parent, ACTIVITY_INTERVAL)
    }

    /// Same as [`start`](Self::start) with a custom interval.
    pub fn start_with_interval(
        sink: Arc<dyn ChatSink>,
        chat_id: i64,
        kind: ActivityKind,
        parent: &CancellationToken,
        interval: Duration,
    ) -> Self {
        let token = parent.child_token();
        let loop_token = token.clone();

        let handle = tokio::spawn(async move {
            // The first notification goes out even if the signal is stopped
            // before this task gets to run.
            if let Err(e) = sink.send_activity(chat_id, kind).await {
                debug!(chat_id, ?kind, error = %e, "Activity signal stopped");
                return;
            }

            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = loop_token.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = sink.send_activity(chat_id, kind).await {
                            debug!(chat_id, ?kind, error = %e, "Activity signal stopped");
                            break;
                        }
                    }
                }
            }
        });

        Self { token, handle }
    }

    /// Stops the signal. Safe to call more than once.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Whether the background loop is still running.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for ActivitySignal {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
