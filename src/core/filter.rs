//! Visible-window filtering of chat messages.
//!
//! The chat panel only shows messages whose timestamp has been reached by
//! playback. Messages are kept sorted by `timestamp_sec`, so the visible set
//! is always a prefix of the sequence.

use super::chat::ChatMessage;

/// Number of leading messages visible at `current_sec`.
///
/// With no playback position yet (no video loaded) every message is visible.
pub fn visible_len(messages: &[ChatMessage], current_sec: Option<i64>) -> usize {
    match current_sec {
        Some(sec) => messages.partition_point(|m| m.timestamp_sec <= sec),
        None => messages.len(),
    }
}

/// The maximal prefix of `messages` with `timestamp_sec <= current_sec`.
pub fn visible(messages: &[ChatMessage], current_sec: Option<i64>) -> &[ChatMessage] {
    &messages[..visible_len(messages, current_sec)]
}

/// Index at which a message stamped `sec` keeps the sequence sorted.
///
/// Lands after every existing message with the same timestamp.
pub fn insertion_index(messages: &[ChatMessage], sec: i64) -> usize {
    messages.partition_point(|m| m.timestamp_sec <= sec)
}
