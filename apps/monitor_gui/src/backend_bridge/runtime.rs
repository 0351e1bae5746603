//! Background worker thread hosting the async runtime. The UI thread talks
//! to it over a crossbeam command channel and reads results back from a
//! crossbeam event channel, so the egui paint loop never awaits anything.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use detector_client::{event_channel, DetectorClient, DetectorEvent};
use tokio::sync::broadcast;

use crate::backend_bridge::commands::BackendCommand;
use crate::config::Settings;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::session::{SessionController, SessionFlags};

pub fn spawn_backend_thread(
    settings: Settings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.send(UiEvent::Error(UiError::from_message(format!(
                    "backend worker failed to start: {err}"
                ))));
                return;
            }
        };

        runtime.block_on(async move {
            let client = match DetectorClient::new(&settings.server_url) {
                Ok(client) => client,
                Err(err) => {
                    tracing::error!("failed to build detector client: {err}");
                    let _ = ui_tx.send(UiEvent::Error(UiError::from_message(err.to_string())));
                    return;
                }
            };

            let (events_tx, events_rx) = event_channel();
            let flags = Arc::new(SessionFlags::default());
            let forwarder = spawn_event_forwarder(events_rx, ui_tx.clone(), flags.clone());

            let mut session = SessionController::new(
                client,
                settings,
                events_tx,
                ui_tx.clone(),
                flags,
            );

            let _ = ui_tx.send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::FetchStatus => session.initialize().await,
                    BackendCommand::ToggleDetection { exercise_type } => {
                        session.toggle(exercise_type).await
                    }
                }
            }

            tracing::info!("command channel closed, backend worker shutting down");
            forwarder.abort();
        });
    });
}

/// Bridges broadcast events from the background tasks onto the UI channel.
///
/// Status snapshots carry the generation of the poller that produced them;
/// anything stamped with an old generation belongs to a stopped session and
/// is dropped here. Snapshots that pass also refresh the shared running flag,
/// so a detector that stops on its own is picked up by the next toggle.
pub(crate) fn spawn_event_forwarder(
    mut events_rx: broadcast::Receiver<DetectorEvent>,
    ui_tx: Sender<UiEvent>,
    flags: Arc<SessionFlags>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = match events_rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("event forwarder lagged, skipped {skipped} events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            let ui_event = match event {
                DetectorEvent::Status {
                    generation,
                    snapshot,
                } => {
                    if generation != flags.generation.load(Ordering::SeqCst) {
                        tracing::debug!("dropping status snapshot from stale generation");
                        continue;
                    }
                    flags.running.store(snapshot.running, Ordering::SeqCst);
                    UiEvent::Status(snapshot)
                }
                DetectorEvent::VideoFrame(frame) => UiEvent::VideoFrame(frame),
                DetectorEvent::VideoConnecting => {
                    tracing::debug!("video feed connecting");
                    continue;
                }
                DetectorEvent::VideoError(message) => {
                    tracing::warn!("video feed error: {message}");
                    continue;
                }
            };

            match ui_tx.try_send(ui_event) {
                Ok(()) => {}
                // A full UI queue just means the paint loop is behind; the
                // next snapshot supersedes the dropped one anyway.
                Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
    })
}
