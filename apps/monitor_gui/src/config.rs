//! Settings for the monitor: defaults, then `monitor.toml`, then environment
//! overrides. The CLI flag in `main` wins over all of these.

use std::{collections::HashMap, fs, time::Duration};

use detector_client::{STATUS_POLL_INTERVAL, VIDEO_RETRY_DELAY};

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub status_poll_interval_ms: u64,
    pub video_retry_delay_ms: u64,
    pub connecting_hide_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            status_poll_interval_ms: STATUS_POLL_INTERVAL.as_millis() as u64,
            video_retry_delay_ms: VIDEO_RETRY_DELAY.as_millis() as u64,
            connecting_hide_delay_ms: 1_500,
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.status_poll_interval_ms)
    }

    pub fn video_retry_delay(&self) -> Duration {
        Duration::from_millis(self.video_retry_delay_ms)
    }

    pub fn connecting_hide_delay(&self) -> Duration {
        Duration::from_millis(self.connecting_hide_delay_ms)
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("monitor.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            apply_file_overrides(&mut settings, &file_cfg);
        }
    }

    if let Ok(v) = std::env::var("MONITOR_SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("APP__SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("APP__STATUS_POLL_INTERVAL_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.status_poll_interval_ms = parsed;
        }
    }
    if let Ok(v) = std::env::var("APP__VIDEO_RETRY_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.video_retry_delay_ms = parsed;
        }
    }

    settings
}

fn apply_file_overrides(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("server_url") {
        settings.server_url = v.clone();
    }
    if let Some(v) = file_cfg.get("status_poll_interval_ms") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.status_poll_interval_ms = parsed;
        }
    }
    if let Some(v) = file_cfg.get("video_retry_delay_ms") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.video_retry_delay_ms = parsed;
        }
    }
}
