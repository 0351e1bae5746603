//! Command-queue plumbing from the UI thread to the backend worker.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues a command without blocking the UI thread. On failure the caller's
/// status line receives a short explanation instead of an event.
pub fn queue_command(cmd_tx: &Sender<BackendCommand>, cmd: BackendCommand, status: &mut String) {
    let cmd_name = match &cmd {
        BackendCommand::FetchStatus => "fetch_status",
        BackendCommand::ToggleDetection { .. } => "toggle_detection",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!("queued backend command: {cmd_name}");
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!("backend command queue full, dropped {cmd_name}");
            *status = "Command queue is full; please retry".to_string();
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::error!("backend command channel disconnected, dropped {cmd_name}");
            *status = "Backend processor disconnected; restart the application".to_string();
        }
    }
}
