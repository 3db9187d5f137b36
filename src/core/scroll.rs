//! Scroll state machine for the chat viewport.
//!
//! The viewport either follows the newest visible message (`AutoFollow`) or
//! stays where the user scrolled it (`Manual`). Transitions return the scroll
//! command the viewport must carry out, if any.

/// Default distance from the bottom, in points, still treated as "at bottom".
pub const DEFAULT_FOLLOW_THRESHOLD: f32 = 50.0;

/// Whether the viewport tracks new messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollMode {
    /// Stick to the newest visible message
    #[default]
    AutoFollow,
    /// The user scrolled away; leave the viewport alone
    Manual,
}

/// Side effect emitted by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCommand {
    /// Move the viewport to the last visible message
    ScrollToBottom,
}

/// Auto-follow / manual scroll tracking for one chat viewport.
#[derive(Debug, Clone)]
pub struct ScrollStateMachine {
    mode: ScrollMode,
    /// Distance from the bottom still counted as "at bottom"
    follow_threshold: f32,
}

impl Default for ScrollStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_FOLLOW_THRESHOLD)
    }
}

impl ScrollStateMachine {
    /// Create a machine in `AutoFollow` with the given bottom threshold.
    pub fn new(follow_threshold: f32) -> Self {
        Self {
            mode: ScrollMode::AutoFollow,
            follow_threshold: follow_threshold.max(0.0),
        }
    }

    /// Current mode.
    pub fn mode(&self) -> ScrollMode {
        self.mode
    }

    /// Whether the "jump to latest" button should be shown.
    pub fn shows_jump_to_latest(&self) -> bool {
        self.mode() == ScrollMode::Manual
    }

    /// The viewport scrolled and now sits `distance_from_bottom` points above
    /// the end of its content.
    pub fn on_scroll(&mut self, distance_from_bottom: f32) {
        let mode = if distance_from_bottom <= self.follow_threshold {
            ScrollMode::AutoFollow
        } else {
            ScrollMode::Manual
        };
        self.set_mode(mode);
    }

    /// More messages became visible because playback advanced.
    pub fn on_visible_grew(&self) -> Option<ScrollCommand> {
        self.follow_command()
    }

    /// The whole message sequence was replaced.
    pub fn on_messages_replaced(&self) -> Option<ScrollCommand> {
        self.follow_command()
    }

    /// A new chat log finished loading.
    pub fn on_log_loaded(&mut self) -> Option<ScrollCommand> {
        self.set_mode(ScrollMode::AutoFollow);
        self.on_messages_replaced()
    }

    /// The user scrubbed the video.
    pub fn on_seek(&mut self) -> Option<ScrollCommand> {
        self.set_mode(ScrollMode::AutoFollow);
        Some(ScrollCommand::ScrollToBottom)
    }

    /// The user clicked "jump to latest".
    pub fn on_jump_to_latest(&mut self) -> Option<ScrollCommand> {
        self.set_mode(ScrollMode::AutoFollow);
        Some(ScrollCommand::ScrollToBottom)
    }

    /// Update the bottom threshold (settings change).
    pub fn set_follow_threshold(&mut self, threshold: f32) {
        self.follow_threshold = threshold.max(0.0);
    }

    fn follow_command(&self) -> Option<ScrollCommand> {
        match self.mode() {
            ScrollMode::AutoFollow => Some(ScrollCommand::ScrollToBottom),
            ScrollMode::Manual => None,
        }
    }

    fn set_mode(&mut self, mode: ScrollMode) {
        if self.mode != mode {
            tracing::debug!(from = ?self.mode, to = ?mode, "chat scroll mode changed");
            self.mode = mode;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let machine = ScrollStateMachine::default();
        assert_eq!(machine.mode(), ScrollMode::AutoFollow);
        assert!(!machine.shows_jump_to_latest());
    }

    #[test]
    fn test_scroll_away_enters_manual() {
        let mut machine = ScrollStateMachine::default();
        machine.on_scroll(120.0);
        assert_eq!(machine.mode(), ScrollMode::Manual);
        assert!(machine.shows_jump_to_latest());
    }

    #[test]
    fn test_scroll_near_bottom_stays_following() {
        let mut machine = ScrollStateMachine::default();
        machine.on_scroll(49.0);
        assert_eq!(machine.mode(), ScrollMode::AutoFollow);
        machine.on_scroll(50.0);
        assert_eq!(machine.mode(), ScrollMode::AutoFollow);
    }

    #[test]
    fn test_scroll_back_to_bottom_resumes_following() {
        let mut machine = ScrollStateMachine::default();
        machine.on_scroll(400.0);
        machine.on_scroll(10.0);
        assert_eq!(machine.mode(), ScrollMode::AutoFollow);
    }

    #[test]
    fn test_visible_growth_follows_only_in_auto() {
        let mut machine = ScrollStateMachine::default();
        assert_eq!(
            machine.on_visible_grew(),
            Some(ScrollCommand::ScrollToBottom)
        );

        machine.on_scroll(300.0);
        assert_eq!(machine.on_visible_grew(), None);
        assert_eq!(machine.on_messages_replaced(), None);
    }

    #[test]
    fn test_seek_restores_follow() {
        let mut machine = ScrollStateMachine::default();
        machine.on_scroll(1000.0);
        assert_eq!(machine.on_seek(), Some(ScrollCommand::ScrollToBottom));
        assert_eq!(machine.mode(), ScrollMode::AutoFollow);
    }

    #[test]
    fn test_seek_in_auto_still_scrolls() {
        let mut machine = ScrollStateMachine::default();
        assert_eq!(machine.on_seek(), Some(ScrollCommand::ScrollToBottom));
    }

    #[test]
    fn test_log_loaded_restores_follow() {
        let mut machine = ScrollStateMachine::default();
        machine.on_scroll(1000.0);
        assert_eq!(
            machine.on_log_loaded(),
            Some(ScrollCommand::ScrollToBottom)
        );
        assert_eq!(machine.mode(), ScrollMode::AutoFollow);
    }

    #[test]
    fn test_jump_to_latest() {
        let mut machine = ScrollStateMachine::default();
        machine.on_scroll(1000.0);
        assert_eq!(
            machine.on_jump_to_latest(),
            Some(ScrollCommand::ScrollToBottom)
        );
        assert!(!machine.shows_jump_to_latest());
    }

    #[test]
    fn test_custom_threshold() {
        let mut machine = ScrollStateMachine::new(10.0);
        machine.on_scroll(20.0);
        assert_eq!(machine.mode(), ScrollMode::Manual);

        machine.set_follow_threshold(100.0);
        machine.on_scroll(20.0);
        assert_eq!(machine.mode(), ScrollMode::AutoFollow);
    }
}
