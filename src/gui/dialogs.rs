//! Dialog components for the chat replay viewer.
//!
//! Errors from loading a chat log or persisting settings are shown in a modal
//! window with optional details, a copy button and, for read failures, a retry.

use eframe::egui;

use crate::core::config::ColorSettings;
use crate::core::error::AppError;

/// Actions that can be triggered from the error dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDialogAction {
    /// User wants to retry the failed operation
    Retry,
    /// User dismissed the dialog
    Close,
}

/// State for managing the error dialog.
#[derive(Debug, Clone, Default)]
pub struct ErrorDialogState {
    /// Whether the dialog is currently open
    pub is_open: bool,
    /// The error to display, if any
    pub error: Option<AppError>,
    /// Whether the error details are expanded
    pub details_expanded: bool,
    /// When the details were last copied, for the short confirmation label
    pub copied_at: Option<std::time::Instant>,
}

impl ErrorDialogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the error dialog with the given error.
    ///
    /// A newer error replaces whatever the dialog was showing.
    pub fn show(&mut self, error: AppError) {
        self.is_open = true;
        self.error = Some(error);
        self.details_expanded = false;
        self.copied_at = None;
    }

    pub fn close(&mut self) {
        self.is_open = false;
        self.error = None;
        self.details_expanded = false;
        self.copied_at = None;
    }

    /// Check if the dialog is showing an error.
    pub fn has_error(&self) -> bool {
        self.is_open && self.error.is_some()
    }

    /// Path to reload if the user picks Retry.
    pub fn retry_path(&self) -> Option<std::path::PathBuf> {
        self.error
            .as_ref()
            .filter(|e| e.supports_retry())
            .and_then(|e| e.file_path().cloned())
    }

    /// Whether the "Copied" label should still be visible.
    fn copy_feedback_visible(&self) -> bool {
        self.copied_at
            .is_some_and(|at| at.elapsed() < std::time::Duration::from_secs(2))
    }
}

/// Renderer for the error dialog.
pub struct ErrorDialogRenderer<'a> {
    state: &'a mut ErrorDialogState,
    colors: &'a ColorSettings,
}

impl<'a> ErrorDialogRenderer<'a> {
    pub fn new(state: &'a mut ErrorDialogState, colors: &'a ColorSettings) -> Self {
        Self { state, colors }
    }

    /// Render the error dialog and return the action taken.
    ///
    /// Returns `Some(action)` if the user clicked a button, `None` otherwise.
    pub fn render(&mut self, ctx: &egui::Context) -> Option<ErrorDialogAction> {
        if !self.state.is_open {
            return None;
        }
        let Some(error) = self.state.error.as_ref() else {
            return None;
        };

        let mut action: Option<ErrorDialogAction> = None;

        // Copy out what the window needs so the state can be mutated inside it
        let title = error.dialog_title();
        let brief = error.brief_description();
        let detailed = error.detailed_info();
        let supports_retry = error.supports_retry();
        let is_recoverable = error.is_recoverable();

        // Modal overlay
        let screen_rect = ctx.input(|i| i.viewport_rect());
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("error_dialog_overlay"),
        ));
        painter.rect_filled(screen_rect, 0.0, egui::Color32::from_black_alpha(150));

        egui::Window::new(format!("⚠ {}", title))
            .id(egui::Id::new("error_dialog"))
            .collapsible(false)
            .resizable(true)
            .default_width(450.0)
            .min_width(350.0)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.label(egui::RichText::new(&brief).size(14.0));
                ui.add_space(12.0);

                let details_header = if self.state.details_expanded {
                    "▼ Details"
                } else {
                    "▶ Details"
                };

                if ui
                    .add(egui::Button::new(details_header).frame(false))
                    .clicked()
                {
                    self.state.details_expanded = !self.state.details_expanded;
                }

                if self.state.details_expanded {
                    ui.add_space(4.0);
                    egui::Frame::new()
                        .fill(egui::Color32::from_gray(30))
                        .inner_margin(8.0)
                        .corner_radius(4.0)
                        .show(ui, |ui| {
                            ui.style_mut().override_font_id = Some(egui::FontId::monospace(12.0));
                            ui.add(
                                egui::Label::new(
                                    egui::RichText::new(&detailed).color(egui::Color32::LIGHT_GRAY),
                                )
                                .wrap(),
                            );
                        });
                }

                ui.add_space(12.0);

                if self.state.copy_feedback_visible() {
                    ui.colored_label(self.colors.status_success_color(), "Copied to clipboard!");
                    ui.add_space(4.0);
                    ctx.request_repaint_after(std::time::Duration::from_millis(250));
                } else {
                    self.state.copied_at = None;
                }

                ui.separator();

                ui.horizontal(|ui| {
                    if ui
                        .button("📋 Copy Error")
                        .on_hover_text("Copy error details to clipboard")
                        .clicked()
                    {
                        ui.ctx().copy_text(detailed.clone());
                        self.state.copied_at = Some(std::time::Instant::now());
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if is_recoverable && ui.button("Close").clicked() {
                            action = Some(ErrorDialogAction::Close);
                        }

                        if supports_retry
                            && ui
                                .button("🔄 Retry")
                                .on_hover_text("Try loading the chat log again")
                                .clicked()
                        {
                            action = Some(ErrorDialogAction::Retry);
                        }
                    });
                });

                ui.add_space(4.0);
            });

        action
    }
}
