mod backend_bridge;
mod config;
mod controller;
mod media;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::backend_bridge::runtime::spawn_backend_thread;
use crate::config::load_settings;
use crate::controller::events::UiEvent;
use crate::ui::app::MonitorApp;

/// Desktop monitor for the camera exercise-form detection server.
#[derive(Parser, Debug)]
#[command(name = "form-monitor", version, about)]
struct Args {
    /// Base URL of the detection server, overriding config and environment.
    #[arg(long)]
    server_url: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let mut settings = load_settings();
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    tracing::info!(server_url = %settings.server_url, "starting monitor");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    spawn_backend_thread(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Exercise Form Monitor")
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([720.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Exercise Form Monitor",
        options,
        Box::new(|_cc| Ok(Box::new(MonitorApp::new(cmd_tx, ui_rx)))),
    )
}
