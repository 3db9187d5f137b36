//! Main application state and GUI logic.
//!
//! This module defines the main application struct and implements the eframe::App trait.
//! Every change to the chat goes through the `ChatSession`; the app turns user input
//! and transport ticks into session events and applies the effects that come back.

use eframe::egui;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::config::AppSettings;
use crate::core::error::AppError;
use crate::core::loader::{self, CHAT_LOG_EXTENSIONS};
use crate::core::playback::{PlaybackClock, PlaybackState, PlaybackSurface};
use crate::core::scroll::ScrollStateMachine;
use crate::core::session::{ChatSession, DEFAULT_DISPLAY_NAME, SessionEffect, SessionEvent};

use super::chat_panel::{ChatPanel, ChatPanelState};
use super::controls::{ControlAction, ControlsRenderer};
use super::dialogs::{ErrorDialogAction, ErrorDialogRenderer, ErrorDialogState};

/// How often to check the inbox while a load is running.
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Application state indicating the current loading status.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum AppState {
    /// No chat log has been loaded yet (initial state)
    #[default]
    NoFileLoaded,
    /// A load is running on a worker thread
    Loading,
    /// A chat log is loaded and ready for replay
    Ready,
}

impl AppState {
    /// Returns true if playback controls should be enabled.
    ///
    /// A reload keeps the previous chat replaying, so controls stay enabled
    /// while loading if messages are on screen.
    pub fn controls_enabled(&self, has_messages: bool) -> bool {
        match self {
            AppState::Ready => true,
            AppState::Loading => has_messages,
            AppState::NoFileLoaded => false,
        }
    }
}

/// Kind of status message to display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusKind {
    /// Success message (shown in green)
    Success,
    /// Error message (shown in red)
    Error,
}

/// A status message with its kind and timestamp.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    /// When the message was created (for auto-dismiss)
    pub created_at: std::time::Instant,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: std::time::Instant::now(),
        }
    }

    /// Duration to show status messages before auto-dismissing.
    const DISPLAY_DURATION: Duration = Duration::from_secs(5);

    /// Check if the message should still be displayed.
    pub fn is_visible(&self) -> bool {
        self.created_at.elapsed() < Self::DISPLAY_DURATION
    }
}

/// Main application state and GUI logic.
pub struct ChatReplayApp {
    /// Current loading status
    state: AppState,
    /// Messages, visible window and scroll mode
    session: ChatSession,
    /// Wall-clock transport standing in for the video player
    playback: PlaybackState,
    /// Turns transport positions into whole-second events
    clock: PlaybackClock,
    /// Persistent settings
    settings: AppSettings,
    /// Path of the chat log currently shown
    loaded_file_path: Option<PathBuf>,
    /// Status message to display (success/error notifications)
    status_message: Option<StatusMessage>,
    /// Chat list and composer state
    chat_panel: ChatPanelState,
    /// Error dialog state
    error_dialog: ErrorDialogState,
    /// Whether the settings window is open
    show_settings: bool,
}

impl ChatReplayApp {
    /// Create a new application instance.
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        Self::from_settings(settings)
    }

    fn from_settings(settings: AppSettings) -> Self {
        let scroll = ScrollStateMachine::new(settings.follow_threshold_px);
        let session = ChatSession::new(scroll, settings.display_name.clone());

        let mut playback = PlaybackState::new();
        playback.set_speed(settings.get_default_speed());

        Self {
            state: AppState::NoFileLoaded,
            session,
            playback,
            clock: PlaybackClock::new(),
            settings,
            loaded_file_path: None,
            status_message: None,
            chat_panel: ChatPanelState::new(),
            error_dialog: ErrorDialogState::new(),
            show_settings: false,
        }
    }

    /// Open a file dialog and load the selected chat log.
    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Live chat log", CHAT_LOG_EXTENSIONS)
            .set_title("Open Chat Log")
            .pick_file()
        {
            self.load_file(path);
        }
    }

    /// Start loading a chat log on a worker thread.
    ///
    /// The current chat stays on screen until the load finishes.
    fn load_file(&mut self, path: PathBuf) {
        self.state = AppState::Loading;
        loader::spawn_load(path, self.session.sender());
    }

    /// Load a file dropped onto the window, refusing unknown extensions.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().and_then(|f| f.path.clone()));
        let Some(path) = dropped else {
            return;
        };

        match loader::check_extension(&path) {
            Ok(()) => self.load_file(path),
            Err(error) => self.show_error(error),
        }
    }

    /// Show an error in the status bar and the error dialog.
    fn show_error(&mut self, error: AppError) {
        self.status_message = Some(StatusMessage::new(
            error.brief_description(),
            StatusKind::Error,
        ));
        self.error_dialog.show(error);
    }

    /// Feed an event to the session and apply what it asks for.
    fn dispatch(&mut self, event: SessionEvent) {
        let effects = self.session.handle(event);
        self.apply_effects(effects);
    }

    /// Apply session effects to the UI.
    fn apply_effects(&mut self, effects: Vec<SessionEffect>) {
        for effect in effects {
            match effect {
                SessionEffect::ScrollToBottom => self.chat_panel.request_scroll_to_bottom(),
                SessionEffect::LogReplaced {
                    path,
                    message_count,
                    total_lines,
                    skipped_lines,
                } => {
                    let summary = load_summary(&path, message_count, total_lines, skipped_lines);
                    self.on_log_replaced(path, summary);
                }
                SessionEffect::LoadFailed(error) => {
                    self.state = if self.session.has_messages() {
                        AppState::Ready
                    } else {
                        AppState::NoFileLoaded
                    };
                    self.show_error(error);
                }
            }
        }
    }

    fn on_log_replaced(&mut self, path: PathBuf, summary: String) {
        self.state = AppState::Ready;
        self.playback.pause();
        self.playback.set_duration(self.session.timeline_end() as f64);
        self.clock.reset();

        // Re-sync the session if a position was already known, since the new
        // timeline may have clamped it
        if self.session.current_sec().is_some() {
            self.seek_to(self.playback.position());
        }

        self.status_message = Some(StatusMessage::new(summary, StatusKind::Success));

        self.settings.add_recent_file(path.clone());
        self.save_settings();
        self.loaded_file_path = Some(path);
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save() {
            tracing::warn!(error = %e.brief_description(), "failed to save settings");
        }
    }

    fn controls_enabled(&self) -> bool {
        self.state.controls_enabled(self.session.has_messages())
    }

    /// Track the window size so it can be restored on the next start.
    fn remember_window_size(&mut self, ctx: &egui::Context) {
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.settings.set_window_size(rect.width(), rect.height());
        }
    }

    /// Move the transport and tell the session about the seek.
    fn seek_to(&mut self, position_secs: f64) {
        self.playback.seek(position_secs);
        self.announce_seek();
    }

    /// Report the transport's current position to the session as a seek.
    fn announce_seek(&mut self) {
        let event = self.clock.on_seek(self.playback.position());
        self.dispatch(SessionEvent::Clock(event));
    }

    /// Advance the transport and emit a time change when the second rolls over.
    fn advance_playback(&mut self, ctx: &egui::Context) {
        if !self.playback.is_playing() {
            return;
        }

        self.playback.tick();
        if let Some(event) = self.clock.on_position(self.playback.position()) {
            self.dispatch(SessionEvent::Clock(event));
        }

        // Keep requesting repaints while playing
        ctx.request_repaint();
    }
}

/// Status text shown after a successful load.
fn load_summary(
    path: &Path,
    message_count: usize,
    total_lines: usize,
    skipped_lines: usize,
) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());

    if skipped_lines == 0 {
        format!("Loaded: {} ({} messages)", name, message_count)
    } else {
        format!(
            "Loaded: {} ({} messages, {} of {} lines skipped)",
            name, message_count, skipped_lines, total_lines
        )
    }
}

impl eframe::App for ChatReplayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        let effects = self.session.pump();
        self.apply_effects(effects);
        if self.state == AppState::Loading {
            ctx.request_repaint_after(LOAD_POLL_INTERVAL);
        }

        self.advance_playback(ctx);

        if let Some(action) = self.handle_keyboard_shortcuts(ctx) {
            self.handle_control_action(action);
        }

        self.remember_window_size(ctx);

        self.render_toolbar(ctx);
        self.render_controls(ctx);
        self.render_chat(ctx);
        self.render_settings_window(ctx);
        self.render_error_dialog(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.save_settings();
    }
}

impl ChatReplayApp {
    /// Handle keyboard shortcuts for playback control.
    ///
    /// Shortcuts are ignored while a text field has focus or the error dialog is open.
    fn handle_keyboard_shortcuts(&self, ctx: &egui::Context) -> Option<ControlAction> {
        if !self.controls_enabled()
            || self.error_dialog.has_error()
            || ctx.wants_keyboard_input()
        {
            return None;
        }

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Space) {
                return Some(ControlAction::TogglePlayPause);
            }
            if i.key_pressed(egui::Key::ArrowLeft) {
                return Some(ControlAction::StepBackward);
            }
            if i.key_pressed(egui::Key::ArrowRight) {
                return Some(ControlAction::StepForward);
            }
            if i.key_pressed(egui::Key::Home) {
                return Some(ControlAction::GoToStart);
            }
            if i.key_pressed(egui::Key::End) {
                return Some(ControlAction::GoToEnd);
            }
            None
        })
    }

    /// Handle a control action triggered by user interaction.
    fn handle_control_action(&mut self, action: ControlAction) {
        match action {
            ControlAction::TogglePlayPause => self.playback.toggle(),
            ControlAction::GoToStart => {
                self.playback.go_to_start();
                self.announce_seek();
            }
            ControlAction::StepBackward => {
                self.playback.step(-self.settings.seek_step());
                self.announce_seek();
            }
            ControlAction::StepForward => {
                self.playback.step(self.settings.seek_step());
                self.announce_seek();
            }
            ControlAction::GoToEnd => {
                self.playback.go_to_end();
                self.announce_seek();
            }
            ControlAction::SetSpeed(speed) => {
                self.playback.set_speed(speed);
                self.settings.set_default_speed(speed);
            }
            ControlAction::SeekTo(position) => self.seek_to(position),
        }
    }

    /// Render the top toolbar: file loading, recent files, display name and status.
    fn render_toolbar(&mut self, ctx: &egui::Context) {
        let can_open = self.state != AppState::Loading;
        let mut open_clicked = false;
        let mut recent_clicked: Option<PathBuf> = None;
        let mut clear_recent = false;

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Chat Replay");
                ui.separator();

                ui.add_enabled_ui(can_open, |ui| {
                    if ui.button("📂 Open Chat Log").clicked() {
                        open_clicked = true;
                    }

                    ui.menu_button("Recent", |ui| {
                        if self.settings.recent_files.is_empty() {
                            ui.weak("(none)");
                        }
                        for path in &self.settings.recent_files {
                            if ui.button(path.display().to_string()).clicked() {
                                recent_clicked = Some(path.clone());
                                ui.close();
                            }
                        }
                        if !self.settings.recent_files.is_empty() {
                            ui.separator();
                            if ui.button("Clear").clicked() {
                                clear_recent = true;
                                ui.close();
                            }
                        }
                    });
                });

                ui.separator();

                if ui.button("⚙ Settings").clicked() {
                    self.show_settings = !self.show_settings;
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.render_status_message(ui);
                });
            });
        });

        if clear_recent {
            self.settings.clear_recent_files();
            self.save_settings();
        }
        if open_clicked {
            self.open_file_dialog();
        } else if let Some(path) = recent_clicked {
            self.load_file(path);
        }
    }

    /// Render the status message if one is active.
    fn render_status_message(&mut self, ui: &mut egui::Ui) {
        if self
            .status_message
            .as_ref()
            .is_some_and(|msg| !msg.is_visible())
        {
            self.status_message = None;
            return;
        }

        let colors = &self.settings.colors;
        let msg_info = self.status_message.as_ref().map(|msg| {
            let color = match msg.kind {
                StatusKind::Success => colors.status_success_color(),
                StatusKind::Error => colors.status_error_color(),
            };
            (color, msg.text.clone())
        });

        if let Some((color, text)) = msg_info {
            let mut dismiss_clicked = false;

            ui.horizontal(|ui| {
                if ui.small_button("✕").clicked() {
                    dismiss_clicked = true;
                }
                ui.colored_label(color, &text);
            });

            if dismiss_clicked {
                self.status_message = None;
            }
        }
    }

    /// Render the bottom transport controls.
    fn render_controls(&mut self, ctx: &egui::Context) {
        let mut action: Option<ControlAction> = None;

        egui::TopBottomPanel::bottom("controls")
            .min_height(60.0)
            .show(ctx, |ui| {
                let renderer = ControlsRenderer::new(
                    self.controls_enabled(),
                    &self.playback,
                    self.settings.seek_step(),
                );
                action = renderer.render(ui);
            });

        if let Some(action) = action {
            self.handle_control_action(action);
        }
    }

    /// Render the central chat area.
    fn render_chat(&mut self, ctx: &egui::Context) {
        let mut events = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state == AppState::Loading && !self.session.has_messages() {
                render_loading_placeholder(ui);
                return;
            }
            if !self.session.has_messages() {
                render_no_file_placeholder(ui);
                return;
            }

            if let Some(path) = &self.loaded_file_path {
                ui.horizontal(|ui| {
                    ui.label(
                        path.file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| "Unknown".to_string()),
                    );
                    ui.separator();
                    ui.label(format!(
                        "{} / {} messages",
                        self.session.visible_len(),
                        self.session.messages().len()
                    ));
                    if self.state == AppState::Loading {
                        ui.separator();
                        ui.spinner();
                    }
                });
                ui.separator();
            }

            let mut panel = ChatPanel::new(
                self.session.visible_messages(),
                &self.settings.colors,
                self.session.shows_jump_to_latest(),
                &mut self.chat_panel,
            );
            events = panel.render(ui);
        });

        for event in events {
            self.dispatch(event);
        }
    }

    /// Render the settings window when open.
    fn render_settings_window(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }

        let mut open = self.show_settings;
        let mut changed = false;
        let mut reset_clicked = false;

        egui::Window::new("⚙ Settings")
            .id(egui::Id::new("settings_window"))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Display name:");
                        changed |= ui
                            .add(
                                egui::TextEdit::singleline(&mut self.settings.display_name)
                                    .desired_width(140.0),
                            )
                            .lost_focus();
                        ui.end_row();

                        ui.label("Seek step:");
                        changed |= ui
                            .add(
                                egui::Slider::new(&mut self.settings.seek_step_secs, 1..=60)
                                    .suffix(" s"),
                            )
                            .changed();
                        ui.end_row();

                        ui.label("Follow threshold:");
                        changed |= ui
                            .add(
                                egui::Slider::new(
                                    &mut self.settings.follow_threshold_px,
                                    0.0..=300.0,
                                )
                                .suffix(" pt"),
                            )
                            .changed();
                        ui.end_row();
                    });

                ui.separator();
                if ui.button("Reset to defaults").clicked() {
                    reset_clicked = true;
                }
            });

        self.show_settings = open;

        if reset_clicked {
            self.settings.reset();
            self.playback.set_speed(self.settings.get_default_speed());
            changed = true;
        }
        if changed {
            self.apply_settings();
            self.save_settings();
        }
    }

    /// Push edited settings into the session.
    fn apply_settings(&mut self) {
        if self.settings.display_name.trim().is_empty() {
            self.settings.display_name = DEFAULT_DISPLAY_NAME.to_string();
        }
        self.session
            .set_display_name(self.settings.display_name.clone());
        self.session
            .set_follow_threshold(self.settings.follow_threshold_px);
    }

    /// Render the error dialog and handle its buttons.
    fn render_error_dialog(&mut self, ctx: &egui::Context) {
        let retry_path = self.error_dialog.retry_path();
        let action =
            ErrorDialogRenderer::new(&mut self.error_dialog, &self.settings.colors).render(ctx);

        match action {
            Some(ErrorDialogAction::Retry) => {
                self.error_dialog.close();
                if let Some(path) = retry_path {
                    self.load_file(path);
                }
            }
            Some(ErrorDialogAction::Close) => self.error_dialog.close(),
            None => {}
        }
    }
}

/// Render the placeholder view when no chat log is loaded.
fn render_no_file_placeholder(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.heading("💬 No Chat Log Loaded");
        ui.add_space(10.0);
        ui.label("Drag and drop a live chat replay export (.jsonl or .txt) to get started.");
        ui.label("Or use the \"Open Chat Log\" button in the toolbar.");
    });
}

/// Render the loading placeholder view.
fn render_loading_placeholder(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(50.0);
        ui.heading("⏳ Loading...");
        ui.add_space(20.0);
        ui.label("Please wait while the chat log is parsed.");
        ui.add_space(20.0);
        ui.spinner();
    });
}
