use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use reqwest::Client;
use shared::{
    error::{ApiException, ApiRejection},
    protocol::{CommandAck, StartRequest, StatusSnapshot},
};
use thiserror::Error;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, warn};
use url::Url;

pub mod mjpeg;

/// Cadence of the status poll while a session is running.
pub const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Fixed wait between video feed reconnect attempts. Retries are unbounded;
/// only dropping the task handle ends them.
pub const VIDEO_RETRY_DELAY: Duration = Duration::from_secs(2);

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("invalid server url '{url}': {source}")]
    InvalidServerUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Api(#[from] ApiException),
}

/// Everything the background tasks report back, fanned out over a broadcast
/// channel so the owner can forward it wherever the UI lives.
#[derive(Debug, Clone)]
pub enum DetectorEvent {
    /// A poll result, tagged with the session generation the poller was
    /// spawned under so stale snapshots can be told apart from live ones.
    Status {
        generation: u64,
        snapshot: StatusSnapshot,
    },
    VideoConnecting,
    VideoFrame(Vec<u8>),
    VideoError(String),
}

pub fn event_channel() -> (
    broadcast::Sender<DetectorEvent>,
    broadcast::Receiver<DetectorEvent>,
) {
    broadcast::channel(EVENT_CHANNEL_CAPACITY)
}

/// Thin HTTP client for the detection server's command surface.
#[derive(Debug, Clone)]
pub struct DetectorClient {
    http: Client,
    base_url: String,
}

impl DetectorClient {
    pub fn new(server_url: impl Into<String>) -> Result<Self, DetectorError> {
        let raw = server_url.into();
        let parsed = Url::parse(&raw).map_err(|source| DetectorError::InvalidServerUrl {
            url: raw.clone(),
            source,
        })?;
        Ok(Self {
            http: Client::new(),
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn status(&self) -> Result<StatusSnapshot, DetectorError> {
        let res = self
            .http
            .get(format!("{}/status", self.base_url))
            .send()
            .await?;
        let res = Self::check(res).await?;
        Ok(res.json().await?)
    }

    /// Sends the start command with the selected exercise kind. The kind is
    /// passed through unvalidated; accepting or rejecting it is the server's
    /// call.
    pub async fn start(&self, exercise_type: &str) -> Result<CommandAck, DetectorError> {
        let res = self
            .http
            .post(format!("{}/start", self.base_url))
            .json(&StartRequest {
                exercise_type: exercise_type.to_string(),
            })
            .send()
            .await?;
        let res = Self::check(res).await?;
        Ok(res.json().await?)
    }

    pub async fn stop(&self) -> Result<CommandAck, DetectorError> {
        let res = self
            .http
            .post(format!("{}/stop", self.base_url))
            .send()
            .await?;
        let res = Self::check(res).await?;
        Ok(res.json().await?)
    }

    /// Video feed URL with a fresh epoch-ms cache buster, so every
    /// (re)connect requests a new stream rather than a cached response.
    pub fn video_feed_url(&self) -> String {
        format!(
            "{}/video_feed?t={}",
            self.base_url,
            Utc::now().timestamp_millis()
        )
    }

    async fn check(res: reqwest::Response) -> Result<reqwest::Response, DetectorError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let rejection = res.json::<ApiRejection>().await.unwrap_or_default();
        Err(ApiException::from((status.as_u16(), rejection)).into())
    }
}

/// Handle to a spawned background task. Dropping it aborts the task, so the
/// owner holding at most one handle is what keeps at most one task alive.
#[derive(Debug)]
pub struct TaskHandle {
    task: JoinHandle<()>,
}

impl TaskHandle {
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    pub fn cancel(self) {
        // Drop aborts.
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Repeating status poll as an explicit cancellable task: spawning returns
/// the handle, replacing the handle cancels the previous cycle.
pub struct StatusPoller;

impl StatusPoller {
    pub fn spawn(
        client: DetectorClient,
        interval: Duration,
        generation: u64,
        events: broadcast::Sender<DetectorEvent>,
    ) -> TaskHandle {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match client.status().await {
                    Ok(snapshot) => {
                        let _ = events.send(DetectorEvent::Status {
                            generation,
                            snapshot,
                        });
                    }
                    Err(err) => {
                        // A failed poll is skipped, never treated as a stop.
                        warn!("status poll failed: {err}");
                    }
                }
            }
        });
        TaskHandle::new(task)
    }
}

/// Live camera stream reader. Connects, decodes the MJPEG multipart stream
/// into frames, and on any error (or clean end of stream) waits the fixed
/// retry delay and reconnects with a fresh cache-busting URL.
pub struct VideoFeed;

impl VideoFeed {
    pub fn spawn(
        client: DetectorClient,
        retry_delay: Duration,
        events: broadcast::Sender<DetectorEvent>,
    ) -> TaskHandle {
        let task = tokio::spawn(async move {
            loop {
                let _ = events.send(DetectorEvent::VideoConnecting);
                match Self::stream_frames(&client, &events).await {
                    Ok(()) => {
                        warn!("video feed stream ended; reconnecting");
                        let _ = events.send(DetectorEvent::VideoError(
                            "stream ended unexpectedly".to_string(),
                        ));
                    }
                    Err(err) => {
                        warn!("video feed failed: {err}; reconnecting");
                        let _ = events.send(DetectorEvent::VideoError(err.to_string()));
                    }
                }
                tokio::time::sleep(retry_delay).await;
            }
        });
        TaskHandle::new(task)
    }

    async fn stream_frames(
        client: &DetectorClient,
        events: &broadcast::Sender<DetectorEvent>,
    ) -> Result<(), DetectorError> {
        let url = client.video_feed_url();
        debug!(%url, "connecting video feed");
        let res = client.http.get(&url).send().await?;
        let res = DetectorClient::check(res).await?;

        let boundary = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(mjpeg::boundary_from_content_type)
            .unwrap_or_else(|| mjpeg::DEFAULT_BOUNDARY.to_string());

        let mut parser = mjpeg::FrameParser::new(&boundary);
        let mut stream = res.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for frame in parser.push(&chunk) {
                let _ = events.send(DetectorEvent::VideoFrame(frame));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
