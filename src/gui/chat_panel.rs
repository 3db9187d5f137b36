//! Chat panel rendering module.
//!
//! Draws the visible messages in a scrolling list, reports user scrolling back
//! to the session, and hosts the "jump to latest" button and the composer.

use eframe::egui::{self, Color32, RichText};

use crate::core::chat::ChatMessage;
use crate::core::config::ColorSettings;
use crate::core::session::SessionEvent;

/// Diameter of the avatar circle.
const AVATAR_SIZE: f32 = 24.0;

/// Vertical gap between messages.
const ROW_SPACING: f32 = 6.0;

/// Per-frame state the panel keeps between renders.
#[derive(Debug, Default)]
pub struct ChatPanelState {
    /// Composer text not yet sent
    pub draft: String,
    /// Scroll offset seen on the previous frame
    last_offset: Option<f32>,
    /// Scroll to the bottom on the next render
    scroll_to_bottom: bool,
}

impl ChatPanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a scroll to the bottom for the next render.
    pub fn request_scroll_to_bottom(&mut self) {
        self.scroll_to_bottom = true;
    }

    /// Take the draft for sending, leaving the composer empty.
    ///
    /// Returns `None` and keeps the draft when it is only whitespace.
    fn take_submission(&mut self) -> Option<String> {
        if self.draft.trim().is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.draft))
    }
}

/// Distance in points between the bottom of the viewport and the end of the content.
pub fn distance_from_bottom(content_height: f32, viewport_height: f32, offset: f32) -> f32 {
    (content_height - viewport_height - offset).max(0.0)
}

/// Renderer for the chat list and composer.
pub struct ChatPanel<'a> {
    messages: &'a [ChatMessage],
    colors: &'a ColorSettings,
    show_jump_to_latest: bool,
    state: &'a mut ChatPanelState,
}

impl<'a> ChatPanel<'a> {
    pub fn new(
        messages: &'a [ChatMessage],
        colors: &'a ColorSettings,
        show_jump_to_latest: bool,
        state: &'a mut ChatPanelState,
    ) -> Self {
        Self {
            messages,
            colors,
            show_jump_to_latest,
            state,
        }
    }

    /// Render the panel and return the events raised by user interaction.
    pub fn render(&mut self, ui: &mut egui::Ui) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        egui::TopBottomPanel::bottom("chat_composer")
            .resizable(false)
            .show_inside(ui, |ui| {
                ui.add_space(4.0);
                if self.show_jump_to_latest {
                    self.render_jump_button(ui, &mut events);
                    ui.add_space(4.0);
                }
                self.render_composer(ui, &mut events);
                ui.add_space(4.0);
            });

        egui::CentralPanel::default().show_inside(ui, |ui| {
            self.render_messages(ui, &mut events);
        });

        events
    }

    /// Render the scrolling message list and detect user scrolling.
    fn render_messages(&mut self, ui: &mut egui::Ui, events: &mut Vec<SessionEvent>) {
        let forced = std::mem::take(&mut self.state.scroll_to_bottom);

        let output = egui::ScrollArea::vertical()
            .id_salt("chat_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if self.messages.is_empty() {
                    ui.weak("No messages yet.");
                    return;
                }
                let mut last_row = None;
                for message in self.messages {
                    last_row = Some(self.render_message(ui, message));
                    ui.add_space(ROW_SPACING);
                }
                // Unanimated, so no intermediate offsets are reported as user scrolling
                if forced && let Some(row) = last_row {
                    row.scroll_to_me_animation(
                        Some(egui::Align::BOTTOM),
                        egui::style::ScrollAnimation::none(),
                    );
                }
            });

        let offset = output.state.offset.y;
        let changed = self
            .state
            .last_offset
            .is_none_or(|last| (last - offset).abs() > f32::EPSILON);
        self.state.last_offset = Some(offset);

        if changed && !forced {
            events.push(SessionEvent::Scrolled {
                distance_from_bottom: distance_from_bottom(
                    output.content_size.y,
                    output.inner_rect.height(),
                    offset,
                ),
            });
        }
    }

    /// Render one message row.
    fn render_message(&self, ui: &mut egui::Ui, message: &ChatMessage) -> egui::Response {
        match (&message.superchat, message.superchat_tier()) {
            (Some(superchat), Some(tier)) => {
                egui::Frame::new()
                    .fill(self.colors.superchat_color(tier))
                    .inner_margin(6.0)
                    .corner_radius(4.0)
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.horizontal(|ui| {
                            self.render_avatar(ui, message);
                            ui.label(
                                RichText::new(&message.username)
                                    .strong()
                                    .color(Color32::BLACK),
                            );
                            ui.label(
                                RichText::new(&superchat.amount)
                                    .strong()
                                    .color(Color32::BLACK),
                            );
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    ui.label(
                                        RichText::new(&message.timestamp_text)
                                            .small()
                                            .color(Color32::from_black_alpha(160)),
                                    );
                                },
                            );
                        });
                        if !superchat.message.is_empty() {
                            ui.add(
                                egui::Label::new(
                                    RichText::new(&superchat.message).color(Color32::BLACK),
                                )
                                .wrap(),
                            );
                        }
                    })
                    .response
            }
            _ => {
                ui.horizontal_wrapped(|ui| {
                    self.render_avatar(ui, message);
                    ui.label(
                        RichText::new(&message.timestamp_text)
                            .small()
                            .color(self.colors.timestamp_color()),
                    );
                    let name = ui.label(
                        RichText::new(&message.username)
                            .strong()
                            .color(self.colors.role_color(message.role())),
                    );
                    if let Some(badge) = &message.badge {
                        name.on_hover_text(badge);
                    }
                    ui.label(RichText::new(&message.message).color(self.colors.message_text_color()));
                })
                .response
            }
        }
    }

    /// Draw the avatar circle with the author's initial.
    fn render_avatar(&self, ui: &mut egui::Ui, message: &ChatMessage) {
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(AVATAR_SIZE, AVATAR_SIZE), egui::Sense::hover());
        let painter = ui.painter();
        painter.circle_filled(
            rect.center(),
            AVATAR_SIZE / 2.0,
            self.colors.role_color(message.role()),
        );
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            message.avatar_initial(),
            egui::FontId::proportional(13.0),
            Color32::BLACK,
        );
        if let Some(icon) = &message.user_icon {
            response.on_hover_text(icon);
        }
    }

    fn render_jump_button(&self, ui: &mut egui::Ui, events: &mut Vec<SessionEvent>) {
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("⬇ Jump to latest").color(Color32::WHITE))
                .fill(self.colors.jump_button_color())
                .corner_radius(12.0);
            if ui.add(button).clicked() {
                events.push(SessionEvent::JumpToLatest);
            }
        });
    }

    /// Render the composer; Enter or the Send button posts the draft.
    fn render_composer(&mut self, ui: &mut egui::Ui, events: &mut Vec<SessionEvent>) {
        ui.horizontal(|ui| {
            let send_width = 60.0;
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.state.draft)
                    .hint_text("Say something…")
                    .desired_width(ui.available_width() - send_width),
            );
            let entered =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let clicked = ui.button("Send").clicked();

            if (entered || clicked)
                && let Some(text) = self.state.take_submission()
            {
                events.push(SessionEvent::Compose { text });
                response.request_focus();
            }
        });
    }
}
