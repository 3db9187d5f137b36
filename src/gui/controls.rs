//! Playback controls module.
//!
//! This module handles the rendering and interaction of the transport bar:
//! play/pause, skip buttons, the time readout, speed control and the scrubber.

use eframe::egui;

use crate::core::playback::{PlaybackState, PlaybackSurface, SPEED_OPTIONS};
use crate::core::timestamp;

/// User actions that can be triggered from the controls panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    /// Toggle between play and pause
    TogglePlayPause,
    /// Go to the start of the timeline
    GoToStart,
    /// Step backwards by the configured seek step
    StepBackward,
    /// Step forwards by the configured seek step
    StepForward,
    /// Go to the end of the timeline
    GoToEnd,
    /// Change playback speed
    SetSpeed(f32),
    /// Seek to a position in seconds (from scrubber)
    SeekTo(f64),
}

/// Renders playback controls and returns any actions triggered by user interaction.
pub struct ControlsRenderer<'a> {
    /// Whether controls should be enabled
    enabled: bool,
    /// Current transport state
    playback: &'a PlaybackState,
    /// Seconds moved by the step buttons, shown in their tooltips
    seek_step: f64,
}

impl<'a> ControlsRenderer<'a> {
    pub fn new(enabled: bool, playback: &'a PlaybackState, seek_step: f64) -> Self {
        Self {
            enabled,
            playback,
            seek_step,
        }
    }

    /// Render the controls and return any triggered action.
    pub fn render(&self, ui: &mut egui::Ui) -> Option<ControlAction> {
        let mut action: Option<ControlAction> = None;

        ui.vertical(|ui| {
            ui.horizontal(|ui| {
                action = self.render_navigation_buttons(ui).or(action);
                ui.separator();
                self.render_time_readout(ui);
                ui.separator();
                action = self.render_speed_control(ui).or(action);
            });

            ui.add_space(4.0);

            ui.horizontal(|ui| {
                action = self.render_scrubber(ui).or(action);
            });
        });

        action
    }

    /// Render navigation buttons and return any triggered action.
    fn render_navigation_buttons(&self, ui: &mut egui::Ui) -> Option<ControlAction> {
        let mut action: Option<ControlAction> = None;
        let step = self.seek_step as u64;

        ui.add_enabled_ui(self.enabled, |ui| {
            if ui.button("⏮").on_hover_text("Go to start (Home)").clicked() {
                action = Some(ControlAction::GoToStart);
            }
            if ui
                .button("⏪")
                .on_hover_text(format!("Back {}s (←)", step))
                .clicked()
            {
                action = Some(ControlAction::StepBackward);
            }

            let (btn_text, hover_text) = if self.playback.is_playing() {
                ("⏸", "Pause (Space)")
            } else {
                ("▶", "Play (Space)")
            };
            if ui.button(btn_text).on_hover_text(hover_text).clicked() {
                action = Some(ControlAction::TogglePlayPause);
            }

            if ui
                .button("⏩")
                .on_hover_text(format!("Forward {}s (→)", step))
                .clicked()
            {
                action = Some(ControlAction::StepForward);
            }
            if ui.button("⏭").on_hover_text("Go to end (End)").clicked() {
                action = Some(ControlAction::GoToEnd);
            }
        });

        action
    }

    /// Render the "position / duration" readout.
    fn render_time_readout(&self, ui: &mut egui::Ui) {
        ui.monospace(time_readout(
            self.playback.position(),
            self.playback.duration(),
        ));
    }

    /// Render speed control and return any triggered action.
    fn render_speed_control(&self, ui: &mut egui::Ui) -> Option<ControlAction> {
        let mut action: Option<ControlAction> = None;

        ui.add_enabled_ui(self.enabled, |ui| {
            ui.label("Speed:");
            let current_speed = self.playback.speed;
            egui::ComboBox::from_id_salt("speed_combo")
                .selected_text(format!("{:.2}x", current_speed))
                .width(60.0)
                .show_ui(ui, |ui| {
                    for &speed in SPEED_OPTIONS {
                        if ui
                            .selectable_label(
                                (current_speed - speed).abs() < 0.01,
                                format!("{:.2}x", speed),
                            )
                            .clicked()
                        {
                            action = Some(ControlAction::SetSpeed(speed));
                        }
                    }
                });
        });

        action
    }

    /// Render the timeline scrubber and return any triggered action.
    fn render_scrubber(&self, ui: &mut egui::Ui) -> Option<ControlAction> {
        let mut action: Option<ControlAction> = None;

        ui.add_enabled_ui(self.enabled, |ui| {
            let max = self.playback.duration().max(1.0);
            let mut position = self.playback.position();
            ui.spacing_mut().slider_width = ui.available_width() - 8.0;
            let response = ui.add(
                egui::Slider::new(&mut position, 0.0..=max)
                    .show_value(false)
                    .text(""),
            );
            if response.changed() {
                action = Some(ControlAction::SeekTo(position.trunc()));
            }
        });

        action
    }
}

/// Format the transport position, e.g. `01:05 / 12:00`.
fn time_readout(position: f64, duration: f64) -> String {
    format!(
        "{} / {}",
        timestamp::format(position as i64),
        timestamp::format(duration as i64)
    )
}
