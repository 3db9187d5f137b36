//! Playback position tracking.
//!
//! This module provides the clock adapter that turns a continuous playback
//! position into whole-second change events, the `PlaybackSurface` seam a
//! video backend plugs into, and `PlaybackState`, a wall-clock transport used
//! as the surface when no decoder is attached.

use std::time::Instant;

/// Default playback speed (1.0 = normal speed).
pub const DEFAULT_SPEED: f32 = 1.0;

/// Minimum allowed playback speed.
pub const MIN_SPEED: f32 = 0.1;

/// Maximum allowed playback speed.
pub const MAX_SPEED: f32 = 10.0;

/// Available speed presets for the UI.
pub const SPEED_OPTIONS: &[f32] = &[0.25, 0.5, 1.0, 2.0, 4.0];

/// Default arrow-key seek step in seconds.
pub const DEFAULT_SEEK_STEP_SECS: u32 = 5;

/// Events emitted by the clock adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// The whole-second position changed during playback or after a seek
    TimeChanged(i64),
    /// The user moved the position (scrubber or keyboard)
    Seeked(i64),
}

/// Converts raw position updates into discrete clock events.
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    /// Last second reported through `TimeChanged`
    last_emitted: Option<i64>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a native position update.
    ///
    /// Returns `TimeChanged` only when the truncated second differs from the
    /// last one emitted.
    pub fn on_position(&mut self, position_secs: f64) -> Option<ClockEvent> {
        let second = truncate_secs(position_secs);
        if self.last_emitted == Some(second) {
            return None;
        }
        self.last_emitted = Some(second);
        Some(ClockEvent::TimeChanged(second))
    }

    /// Report a user-initiated seek to `position_secs`.
    ///
    /// The time-changed stream is untouched; the next `on_position` call
    /// reports the new second as usual.
    pub fn on_seek(&self, position_secs: f64) -> ClockEvent {
        ClockEvent::Seeked(truncate_secs(position_secs))
    }

    /// Forget the last position (new media loaded).
    pub fn reset(&mut self) {
        self.last_emitted = None;
    }
}

/// Truncate a position to whole seconds.
fn truncate_secs(position_secs: f64) -> i64 {
    if position_secs.is_finite() {
        position_secs.trunc() as i64
    } else {
        0
    }
}

/// A source of playback position that accepts seek commands.
pub trait PlaybackSurface {
    /// Current position in seconds.
    fn position(&self) -> f64;

    /// Total length in seconds.
    fn duration(&self) -> f64;

    /// Move to `position_secs`, clamped to `[0, duration]`.
    fn seek(&mut self, position_secs: f64);

    /// Move by `delta_secs`, clamped to `[0, duration]`; returns the new
    /// position.
    fn step(&mut self, delta_secs: f64) -> f64 {
        let target = (self.position() + delta_secs).clamp(0.0, self.duration().max(0.0));
        self.seek(target);
        self.position()
    }
}

/// Wall-clock transport: position advances with real time while playing.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    /// Current position in seconds.
    position: f64,

    /// Length of the timeline in seconds.
    duration: f64,

    /// Playback speed multiplier (1.0 = normal speed).
    pub speed: f32,

    /// Whether the position is advancing.
    playing: bool,

    /// Last time the position was advanced (for timing control).
    last_update: Instant,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackState {
    /// Create a paused transport at zero with an empty timeline.
    pub fn new() -> Self {
        Self {
            position: 0.0,
            duration: 0.0,
            speed: DEFAULT_SPEED,
            playing: false,
            last_update: Instant::now(),
        }
    }

    /// Replace the timeline length, clamping the position into it.
    pub fn set_duration(&mut self, duration_secs: f64) {
        self.duration = duration_secs.max(0.0);
        self.position = self.position.clamp(0.0, self.duration);
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start or resume playback. Restarts from zero when at the end.
    pub fn play(&mut self) {
        if self.is_at_end() {
            self.position = 0.0;
        }
        self.playing = self.duration > 0.0;
        self.reset_timing();
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Advance the position by the wall time elapsed since the last tick.
    ///
    /// # Returns
    /// `true` while playback continues, `false` once the end was reached.
    pub fn tick(&mut self) -> bool {
        let elapsed = self.last_update.elapsed().as_secs_f64();
        self.advance_by(elapsed)
    }

    /// Advance by `elapsed_secs` of wall time, scaled by the speed.
    pub fn advance_by(&mut self, elapsed_secs: f64) -> bool {
        self.reset_timing();
        if !self.playing {
            return false;
        }

        self.position = (self.position + elapsed_secs * self.speed as f64).min(self.duration);
        if self.is_at_end() {
            self.playing = false;
        }
        self.playing
    }

    /// Set playback speed, clamping to valid range.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Reset the timing for position advance (call when starting playback).
    pub fn reset_timing(&mut self) {
        self.last_update = Instant::now();
    }

    pub fn go_to_start(&mut self) {
        self.seek(0.0);
    }

    pub fn go_to_end(&mut self) {
        self.seek(self.duration);
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.duration
    }
}

impl PlaybackSurface for PlaybackState {
    fn position(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn seek(&mut self, position_secs: f64) {
        self.position = if position_secs.is_finite() {
            position_secs.clamp(0.0, self.duration)
        } else {
            0.0
        };
        self.reset_timing();
    }
}
