//! The monitor window: controls, status readouts, and the live video panel.

use crossbeam_channel::{Receiver, Sender};
use egui::TextureHandle;
use shared::protocol::{FormStatus, StatusSnapshot};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{err_label, UiEvent};
use crate::controller::orchestration::queue_command;
use crate::media::decode_frame;

pub const ANGLE_FALLBACK: &str = "Angle: Not detected";
pub const CAMERA_STOPPED: &str = "Camera stopped";
pub const CONNECTING: &str = "Connecting to camera...";
pub const EXERCISE_KINDS: [&str; 2] = ["hand_raise", "hand_curl"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedbackStyle {
    Good,
    Bad,
    Neutral,
}

impl FeedbackStyle {
    fn color(self) -> egui::Color32 {
        match self {
            FeedbackStyle::Good => egui::Color32::from_rgb(67, 181, 129),
            FeedbackStyle::Bad => egui::Color32::from_rgb(220, 80, 80),
            FeedbackStyle::Neutral => egui::Color32::GRAY,
        }
    }
}

fn toggle_label(running: bool) -> &'static str {
    if running {
        "Stop Detection"
    } else {
        "Start Detection"
    }
}

pub struct MonitorApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    running: bool,
    exercise_type: String,
    exercise_label: String,
    angle_text: String,
    feedback_text: String,
    feedback_style: FeedbackStyle,
    /// Overlay text on the video panel, shown while connecting or stopped.
    indicator: Option<String>,
    latest_frame: Option<Vec<u8>>,
    frame_dirty: bool,
    video_texture: Option<TextureHandle>,
    status: String,
}

impl MonitorApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut status = String::new();
        // Picks up a detector that is already running before the first paint.
        queue_command(&cmd_tx, BackendCommand::FetchStatus, &mut status);
        Self {
            cmd_tx,
            ui_rx,
            running: false,
            exercise_type: EXERCISE_KINDS[0].to_string(),
            exercise_label: String::new(),
            angle_text: ANGLE_FALLBACK.to_string(),
            feedback_text: String::new(),
            feedback_style: FeedbackStyle::Neutral,
            indicator: None,
            latest_frame: None,
            frame_dirty: false,
            video_texture: None,
            status,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Status(snapshot) => {
                    self.apply_status(snapshot);
                }
                UiEvent::DetectionStarted => {
                    self.running = true;
                }
                UiEvent::DetectionStopped => {
                    self.running = false;
                    self.indicator = Some(CAMERA_STOPPED.to_string());
                }
                UiEvent::HideConnecting => {
                    self.indicator = None;
                }
                UiEvent::VideoFrame(frame) => {
                    self.indicator = None;
                    self.latest_frame = Some(frame);
                    self.frame_dirty = true;
                }
                UiEvent::Error(err) => {
                    self.status = format!("{} error: {}", err_label(err.category()), err.message());
                }
            }
        }
    }

    fn apply_status(&mut self, snapshot: StatusSnapshot) {
        self.running = snapshot.running;
        if !snapshot.running {
            // A stopped detector reports nothing worth displaying; the
            // readouts keep whatever the last running session showed.
            return;
        }
        self.angle_text = snapshot
            .angle_text()
            .unwrap_or(ANGLE_FALLBACK)
            .to_string();
        match snapshot.form_status {
            FormStatus::Good => {
                self.feedback_text = snapshot.feedback_text().unwrap_or("").to_string();
                self.feedback_style = FeedbackStyle::Good;
            }
            FormStatus::Bad => {
                self.feedback_text = snapshot.feedback_text().unwrap_or("").to_string();
                self.feedback_style = FeedbackStyle::Bad;
            }
            FormStatus::Unspecified => {
                self.feedback_text.clear();
                self.feedback_style = FeedbackStyle::Neutral;
            }
        }
        if let Some(kind) = snapshot.exercise_type {
            self.exercise_label = kind;
        }
    }

    fn on_toggle_clicked(&mut self) {
        if !self.running {
            self.indicator = Some(CONNECTING.to_string());
        }
        queue_command(
            &self.cmd_tx,
            BackendCommand::ToggleDetection {
                exercise_type: self.exercise_type.clone(),
            },
            &mut self.status,
        );
    }

    fn upload_frame(&mut self, ctx: &egui::Context) {
        if !self.frame_dirty {
            return;
        }
        self.frame_dirty = false;
        let Some(bytes) = self.latest_frame.as_deref() else {
            return;
        };
        match decode_frame(bytes) {
            Ok(frame) => {
                let color_image = egui::ColorImage::from_rgba_unmultiplied(
                    [frame.width, frame.height],
                    &frame.rgba,
                );
                self.video_texture = Some(ctx.load_texture(
                    "video_frame",
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
            }
            Err(err) => {
                tracing::warn!("dropping undecodable frame: {err}");
            }
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let selector = egui::ComboBox::from_label("Exercise")
                .selected_text(self.exercise_type.clone());
            ui.add_enabled_ui(!self.running, |ui| {
                selector.show_ui(ui, |ui| {
                    for kind in EXERCISE_KINDS {
                        ui.selectable_value(&mut self.exercise_type, kind.to_string(), kind);
                    }
                });
            });
            if ui.button(toggle_label(self.running)).clicked() {
                self.on_toggle_clicked();
            }
        });
    }

    fn draw_readouts(&self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new(&self.angle_text).strong().size(18.0));
        if !self.feedback_text.is_empty() {
            ui.label(
                egui::RichText::new(&self.feedback_text)
                    .color(self.feedback_style.color())
                    .size(16.0),
            );
        }
        if !self.exercise_label.is_empty() {
            ui.label(egui::RichText::new(format!("Tracking: {}", self.exercise_label)).weak());
        }
    }

    fn draw_video_panel(&self, ui: &mut egui::Ui) {
        if let Some(texture) = &self.video_texture {
            let size = texture.size_vec2();
            let scale = (ui.available_width() / size.x).min(1.0);
            ui.add(egui::Image::new((texture.id(), size * scale)));
        }
        if let Some(indicator) = &self.indicator {
            ui.label(egui::RichText::new(indicator).italics().size(16.0));
        }
    }

    fn draw_instructions(&self, ui: &mut egui::Ui) {
        ui.collapsing("Instructions", |ui| {
            ui.label("Pick an exercise, press Start Detection, and face the camera.");
            ui.label("Keep the tracked joint inside the frame for an angle readout.");
            ui.label("Feedback turns red when the detector flags the current form.");
        });
    }
}

impl eframe::App for MonitorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.upload_frame(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.small(egui::RichText::new(&self.status).weak());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Exercise Form Monitor");
            ui.add_space(6.0);
            self.draw_controls(ui);
            ui.separator();
            self.draw_readouts(ui);
            ui.add_space(6.0);
            self.draw_video_panel(ui);
            ui.add_space(6.0);
            self.draw_instructions(ui);
        });

        // Frames and the connecting indicator need a lively repaint cadence;
        // an idle window can coast.
        let repaint = if self.running || self.indicator.is_some() {
            std::time::Duration::from_millis(16)
        } else {
            std::time::Duration::from_millis(100)
        };
        ctx.request_repaint_after(repaint);
    }
}
