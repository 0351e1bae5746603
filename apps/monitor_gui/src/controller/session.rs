//! Detection session lifecycle: one status poller and one video feed at a
//! time, with a generation counter to discard responses from sessions that
//! were stopped while their requests were in flight.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use detector_client::{DetectorClient, DetectorEvent, StatusPoller, TaskHandle, VideoFeed};
use tokio::sync::broadcast;

use crate::config::Settings;
use crate::controller::events::UiEvent;

/// Session state shared between the command loop and the event forwarder.
///
/// The generation counter stamps every poller. Stopping a session bumps it,
/// so snapshots produced by an outgoing poller can be recognized and dropped
/// even if they arrive after the stop completed.
#[derive(Default)]
pub struct SessionFlags {
    pub running: AtomicBool,
    pub generation: AtomicU64,
}

pub struct SessionController {
    client: DetectorClient,
    settings: Settings,
    events_tx: broadcast::Sender<DetectorEvent>,
    ui_tx: Sender<UiEvent>,
    flags: Arc<SessionFlags>,
    poll: Option<TaskHandle>,
    video: Option<TaskHandle>,
}

impl SessionController {
    pub fn new(
        client: DetectorClient,
        settings: Settings,
        events_tx: broadcast::Sender<DetectorEvent>,
        ui_tx: Sender<UiEvent>,
        flags: Arc<SessionFlags>,
    ) -> Self {
        Self {
            client,
            settings,
            events_tx,
            ui_tx,
            flags,
            poll: None,
            video: None,
        }
    }

    /// One-shot status query used when the window opens, so the controls
    /// reflect a detector that is already running.
    pub async fn initialize(&mut self) {
        match self.client.status().await {
            Ok(snapshot) => {
                self.flags.running.store(snapshot.running, Ordering::SeqCst);
                let _ = self.ui_tx.send(UiEvent::Status(snapshot));
            }
            Err(err) => {
                tracing::warn!("initial status query failed: {err}");
            }
        }
    }

    pub async fn toggle(&mut self, exercise_type: String) {
        if self.flags.running.load(Ordering::SeqCst) {
            self.stop().await;
        } else {
            self.start(exercise_type).await;
        }
    }

    async fn start(&mut self, exercise_type: String) {
        // Relaunch the feed before asking the server to start, matching the
        // order the status indicator expects: connecting first, frames later.
        self.restart_video_feed();

        match self.client.start(&exercise_type).await {
            Ok(ack) => {
                tracing::info!(status = %ack.status, %exercise_type, "detection started");
                self.flags.running.store(true, Ordering::SeqCst);
                let _ = self.ui_tx.send(UiEvent::DetectionStarted);
                self.schedule_connecting_hide();
                self.restart_poller();
            }
            Err(err) => {
                tracing::warn!("start request failed: {err}");
            }
        }
    }

    async fn stop(&mut self) {
        match self.client.stop().await {
            Ok(ack) => {
                tracing::info!(status = %ack.status, "detection stopped");
                self.flags.running.store(false, Ordering::SeqCst);
                // Bumping the generation invalidates in-flight snapshots and
                // any pending indicator-hide timer from the stopped session.
                self.flags.generation.fetch_add(1, Ordering::SeqCst);
                if let Some(handle) = self.poll.take() {
                    handle.cancel();
                }
                if let Some(handle) = self.video.take() {
                    handle.cancel();
                }
                let _ = self.ui_tx.send(UiEvent::DetectionStopped);
            }
            Err(err) => {
                tracing::warn!("stop request failed: {err}");
            }
        }
    }

    fn restart_poller(&mut self) {
        if let Some(handle) = self.poll.take() {
            handle.cancel();
        }
        let generation = self.flags.generation.load(Ordering::SeqCst);
        self.poll = Some(StatusPoller::spawn(
            self.client.clone(),
            self.settings.poll_interval(),
            generation,
            self.events_tx.clone(),
        ));
    }

    fn restart_video_feed(&mut self) {
        if let Some(handle) = self.video.take() {
            handle.cancel();
        }
        self.video = Some(VideoFeed::spawn(
            self.client.clone(),
            self.settings.video_retry_delay(),
            self.events_tx.clone(),
        ));
    }

    /// The connecting indicator hides itself a short while after a start, but
    /// only if the session it belongs to is still the current one.
    fn schedule_connecting_hide(&self) {
        let delay = self.settings.connecting_hide_delay();
        let flags = self.flags.clone();
        let ui_tx = self.ui_tx.clone();
        let generation = flags.generation.load(Ordering::SeqCst);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if flags.generation.load(Ordering::SeqCst) == generation {
                let _ = ui_tx.send(UiEvent::HideConnecting);
            }
        });
    }

    #[cfg(test)]
    pub(crate) fn has_poller(&self) -> bool {
        self.poll.is_some()
    }

    #[cfg(test)]
    pub(crate) fn flags(&self) -> &Arc<SessionFlags> {
        &self.flags
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
