//! Chat replay session state and event dispatch.
//!
//! All external inputs (load completion, clock ticks, seeks, viewport scrolls,
//! composer submissions) arrive as `SessionEvent`s through one ordered inbox.
//! `ChatSession::handle` is the only place the message sequence, the visible
//! window and the scroll mode change.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use super::chat::ChatMessage;
use super::error::AppError;
use super::filter;
use super::loader::LoadedLog;
use super::playback::ClockEvent;
use super::scroll::{ScrollCommand, ScrollStateMachine};

/// Author name used when none is configured.
pub const DEFAULT_DISPLAY_NAME: &str = "You";

/// External inputs to the session.
#[derive(Debug)]
pub enum SessionEvent {
    /// A chat log load completed, successfully or not
    LoadFinished(Result<LoadedLog, AppError>),
    /// Playback clock output
    Clock(ClockEvent),
    /// The viewport scrolled; distance in points from the bottom of content
    Scrolled { distance_from_bottom: f32 },
    /// The user clicked "jump to latest"
    JumpToLatest,
    /// The user submitted a line in the composer
    Compose { text: String },
}

/// Outputs the presentation layer must act on.
#[derive(Debug, Clone)]
pub enum SessionEffect {
    /// Move the chat viewport to its last visible message
    ScrollToBottom,
    /// A new log replaced the message sequence
    LogReplaced {
        path: PathBuf,
        message_count: usize,
        /// Non-blank lines examined
        total_lines: usize,
        skipped_lines: usize,
    },
    /// A load failed; the previous sequence is still in place
    LoadFailed(AppError),
}

/// Message sequence, playback position and scroll state for one chat panel.
pub struct ChatSession {
    /// All messages, ascending by `timestamp_sec`
    messages: Vec<ChatMessage>,
    /// Last known playback second; `None` until the first tick
    current_sec: Option<i64>,
    /// Length of the visible prefix
    visible_len: usize,
    scroll: ScrollStateMachine,
    /// Author name for composed messages
    display_name: String,
    inbox: Receiver<SessionEvent>,
    sender: Sender<SessionEvent>,
}

impl ChatSession {
    /// Create an empty session.
    pub fn new(scroll: ScrollStateMachine, display_name: impl Into<String>) -> Self {
        let (sender, inbox) = mpsc::channel();
        let mut session = Self {
            messages: Vec::new(),
            current_sec: None,
            visible_len: 0,
            scroll,
            display_name: String::new(),
            inbox,
            sender,
        };
        session.set_display_name(display_name);
        session
    }

    /// A handle for posting events into this session's inbox.
    pub fn sender(&self) -> Sender<SessionEvent> {
        self.sender.clone()
    }

    /// Process every queued event in arrival order.
    pub fn pump(&mut self) -> Vec<SessionEffect> {
        let mut effects = Vec::new();
        while let Ok(event) = self.inbox.try_recv() {
            effects.extend(self.handle(event));
        }
        effects
    }

    /// Apply one event.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionEffect> {
        let mut effects = Vec::new();

        match event {
            SessionEvent::LoadFinished(Ok(loaded)) => {
                tracing::info!(
                    path = %loaded.path.display(),
                    messages = loaded.messages.len(),
                    skipped = loaded.skipped_lines,
                    "chat log loaded"
                );
                effects.push(SessionEffect::LogReplaced {
                    path: loaded.path,
                    message_count: loaded.messages.len(),
                    total_lines: loaded.total_lines,
                    skipped_lines: loaded.skipped_lines,
                });
                self.messages = loaded.messages;
                self.refresh_visible();
                push_command(&mut effects, self.scroll.on_log_loaded());
            }
            SessionEvent::LoadFinished(Err(error)) => {
                tracing::error!(%error, details = %error.detailed_info(), "chat log load failed");
                effects.push(SessionEffect::LoadFailed(error));
            }
            SessionEvent::Clock(ClockEvent::TimeChanged(sec)) => {
                self.current_sec = Some(sec);
                if self.refresh_visible() {
                    push_command(&mut effects, self.scroll.on_visible_grew());
                }
            }
            SessionEvent::Clock(ClockEvent::Seeked(sec)) => {
                self.current_sec = Some(sec);
                self.refresh_visible();
                push_command(&mut effects, self.scroll.on_seek());
            }
            SessionEvent::Scrolled {
                distance_from_bottom,
            } => {
                self.scroll.on_scroll(distance_from_bottom);
            }
            SessionEvent::JumpToLatest => {
                push_command(&mut effects, self.scroll.on_jump_to_latest());
            }
            SessionEvent::Compose { text } => {
                let text = text.trim();
                if !text.is_empty() {
                    let at = self.current_sec.unwrap_or(0);
                    let message = ChatMessage::composed(self.display_name.clone(), text, at);
                    let index = filter::insertion_index(&self.messages, at);
                    self.messages.insert(index, message);
                    if self.refresh_visible() {
                        push_command(&mut effects, self.scroll.on_visible_grew());
                    }
                }
            }
        }

        effects
    }

    /// Recompute the visible prefix; returns true if it grew.
    fn refresh_visible(&mut self) -> bool {
        let previous = self.visible_len;
        self.visible_len = filter::visible_len(&self.messages, self.current_sec);
        self.visible_len > previous
    }

    /// Every loaded message.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages reached by playback.
    pub fn visible_messages(&self) -> &[ChatMessage] {
        filter::visible(&self.messages, self.current_sec)
    }

    pub fn visible_len(&self) -> usize {
        self.visible_len
    }

    pub fn current_sec(&self) -> Option<i64> {
        self.current_sec
    }

    pub fn shows_jump_to_latest(&self) -> bool {
        self.scroll.shows_jump_to_latest()
    }

    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Span of the log in seconds, used as the transport length.
    pub fn timeline_end(&self) -> i64 {
        self.messages
            .last()
            .map(|m| m.timestamp_sec.saturating_add(1).max(0))
            .unwrap_or(0)
    }

    pub fn set_follow_threshold(&mut self, threshold: f32) {
        self.scroll.set_follow_threshold(threshold);
    }

    /// Set the composer author name; blank names fall back to the default.
    pub fn set_display_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.display_name = if name.trim().is_empty() {
            DEFAULT_DISPLAY_NAME.to_string()
        } else {
            name.trim().to_string()
        };
    }
}

fn push_command(effects: &mut Vec<SessionEffect>, command: Option<ScrollCommand>) {
    if let Some(ScrollCommand::ScrollToBottom) = command {
        effects.push(SessionEffect::ScrollToBottom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ChatSession {
        ChatSession::new(ScrollStateMachine::default(), "Tester")
    }

    fn loaded(secs: &[i64]) -> LoadedLog {
        LoadedLog {
            path: PathBuf::from("/logs/chat.jsonl"),
            messages: secs
                .iter()
                .enumerate()
                .map(|(i, &sec)| ChatMessage::composed(format!("user{}", i), "msg", sec))
                .collect(),
            total_lines: secs.len(),
            skipped_lines: 0,
        }
    }

    fn scrolls(effects: &[SessionEffect]) -> bool {
        effects
            .iter()
            .any(|e| matches!(e, SessionEffect::ScrollToBottom))
    }

    #[test]
    fn test_load_without_clock_shows_everything() {
        let mut s = session();
        let effects = s.handle(SessionEvent::LoadFinished(Ok(loaded(&[0, 10, 20]))));

        assert_eq!(s.visible_len(), 3);
        assert!(scrolls(&effects));
        assert!(matches!(
            effects[0],
            SessionEffect::LogReplaced {
                message_count: 3,
                total_lines: 3,
                skipped_lines: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_visible_messages_follow_clock() {
        let mut s = session();
        s.handle(SessionEvent::LoadFinished(Ok(loaded(&[0, 10, 20]))));
        s.handle(SessionEvent::Clock(ClockEvent::TimeChanged(10)));

        let visible: Vec<i64> = s.visible_messages().iter().map(|m| m.timestamp_sec).collect();
        assert_eq!(visible, vec![0, 10]);
        assert_eq!(s.visible_messages().len(), s.visible_len());
    }

    #[test]
    fn test_time_changes_grow_window() {
        let mut s = session();
        s.handle(SessionEvent::Clock(ClockEvent::TimeChanged(0)));
        s.handle(SessionEvent::LoadFinished(Ok(loaded(&[0, 10, 20]))));
        assert_eq!(s.visible_len(), 1);

        let effects = s.handle(SessionEvent::Clock(ClockEvent::TimeChanged(5)));
        assert!(effects.is_empty());

        let effects = s.handle(SessionEvent::Clock(ClockEvent::TimeChanged(10)));
        assert_eq!(s.visible_len(), 2);
        assert!(scrolls(&effects));
    }

    #[test]
    fn test_manual_mode_suppresses_follow() {
        let mut s = session();
        s.handle(SessionEvent::Clock(ClockEvent::TimeChanged(0)));
        s.handle(SessionEvent::LoadFinished(Ok(loaded(&[0, 10, 20]))));
        s.handle(SessionEvent::Scrolled {
            distance_from_bottom: 200.0,
        });
        assert!(s.shows_jump_to_latest());
        assert!(s.shows_jump_to_latest());

        let effects = s.handle(SessionEvent::Clock(ClockEvent::TimeChanged(20)));
        assert_eq!(s.visible_len(), 3);
        assert!(!scrolls(&effects));
    }

    #[test]
    fn test_seek_returns_to_follow() {
        let mut s = session();
        s.handle(SessionEvent::LoadFinished(Ok(loaded(&[0, 10, 20]))));
        s.handle(SessionEvent::Scrolled {
            distance_from_bottom: 200.0,
        });

        let effects = s.handle(SessionEvent::Clock(ClockEvent::Seeked(5)));
        assert!(!s.shows_jump_to_latest());
        assert_eq!(s.visible_len(), 1);
        assert!(scrolls(&effects));
    }

    #[test]
    fn test_failed_load_keeps_previous_state() {
        let mut s = session();
        s.handle(SessionEvent::LoadFinished(Ok(loaded(&[0, 10]))));
        s.handle(SessionEvent::Scrolled {
            distance_from_bottom: 200.0,
        });

        let effects = s.handle(SessionEvent::LoadFinished(Err(AppError::NoValidMessages {
            path: None,
            total_lines: 4,
            skipped: 4,
        })));

        assert_eq!(s.messages().len(), 2);
        assert!(s.shows_jump_to_latest());
        assert!(matches!(effects.as_slice(), [SessionEffect::LoadFailed(_)]));
    }

    #[test]
    fn test_new_load_replaces_and_restores_follow() {
        let mut s = session();
        s.handle(SessionEvent::LoadFinished(Ok(loaded(&[0, 10]))));
        s.handle(SessionEvent::Scrolled {
            distance_from_bottom: 200.0,
        });

        let effects = s.handle(SessionEvent::LoadFinished(Ok(loaded(&[1, 2, 3, 4]))));
        assert_eq!(s.messages().len(), 4);
        assert!(!s.shows_jump_to_latest());
        assert!(scrolls(&effects));
    }

    #[test]
    fn test_jump_to_latest() {
        let mut s = session();
        s.handle(SessionEvent::Scrolled {
            distance_from_bottom: 200.0,
        });
        let effects = s.handle(SessionEvent::JumpToLatest);
        assert!(scrolls(&effects));
        assert!(!s.shows_jump_to_latest());
    }

    #[test]
    fn test_compose_inserts_in_order() {
        let mut s = session();
        s.handle(SessionEvent::LoadFinished(Ok(loaded(&[0, 10, 20]))));
        s.handle(SessionEvent::Clock(ClockEvent::Seeked(10)));
        s.handle(SessionEvent::Clock(ClockEvent::TimeChanged(10)));

        let effects = s.handle(SessionEvent::Compose {
            text: "  hi there ".to_string(),
        });

        assert!(scrolls(&effects));
        assert_eq!(s.messages().len(), 4);
        assert_eq!(s.visible_len(), 3);
        let composed = &s.messages()[2];
        assert_eq!(composed.username, "Tester");
        assert_eq!(composed.message, "hi there");
        assert_eq!(composed.timestamp_sec, 10);
        assert_eq!(composed.timestamp_text, "00:10");
        assert!(
            s.messages()
                .windows(2)
                .all(|w| w[0].timestamp_sec <= w[1].timestamp_sec)
        );
    }

    #[test]
    fn test_compose_then_seek_back_hides_message() {
        let mut s = session();
        s.handle(SessionEvent::LoadFinished(Ok(loaded(&[0, 30]))));
        s.handle(SessionEvent::Clock(ClockEvent::TimeChanged(15)));
        s.handle(SessionEvent::Compose {
            text: "mid".to_string(),
        });
        s.handle(SessionEvent::Clock(ClockEvent::Seeked(5)));

        assert_eq!(s.visible_len(), 1);
        assert!(s.visible_messages().iter().all(|m| m.message != "mid"));
    }

    #[test]
    fn test_compose_blank_is_ignored() {
        let mut s = session();
        let effects = s.handle(SessionEvent::Compose {
            text: "   ".to_string(),
        });
        assert!(effects.is_empty());
        assert!(!s.has_messages());
    }

    #[test]
    fn test_display_name_fallback() {
        let mut s = ChatSession::new(ScrollStateMachine::default(), "  ");
        s.handle(SessionEvent::Compose {
            text: "hello".to_string(),
        });
        assert_eq!(s.messages()[0].username, DEFAULT_DISPLAY_NAME);
    }

    #[test]
    fn test_pump_processes_in_order() {
        let mut s = session();
        let tx = s.sender();
        tx.send(SessionEvent::LoadFinished(Ok(loaded(&[0, 10, 20]))))
            .unwrap();
        tx.send(SessionEvent::Clock(ClockEvent::TimeChanged(10)))
            .unwrap();
        tx.send(SessionEvent::LoadFinished(Ok(loaded(&[0, 1, 2, 3, 4]))))
            .unwrap();

        let effects = s.pump();
        let replaced = effects
            .iter()
            .filter(|e| matches!(e, SessionEffect::LogReplaced { .. }))
            .count();
        assert_eq!(replaced, 2);
        // Last completion wins
        assert_eq!(s.messages().len(), 5);
        assert_eq!(s.visible_len(), 5);
        assert!(s.pump().is_empty());
    }

    #[test]
    fn test_timeline_end() {
        let mut s = session();
        assert_eq!(s.timeline_end(), 0);
        s.handle(SessionEvent::LoadFinished(Ok(loaded(&[-20, 5, 90]))));
        assert_eq!(s.timeline_end(), 91);
    }
}
