//! Configuration and settings module.
//!
//! This module handles persistent settings including the chat colour scheme,
//! replay preferences, and saving/loading configuration to disk.

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::chat::{ChatRole, SuperchatTier};
use super::error::AppError;
use super::playback::{DEFAULT_SEEK_STEP_SECS, DEFAULT_SPEED, MAX_SPEED, MIN_SPEED};
use super::scroll::DEFAULT_FOLLOW_THRESHOLD;
use super::session::DEFAULT_DISPLAY_NAME;

/// Directory name under the user's config directory.
const APP_DIR_NAME: &str = "chat-replay-viewer";

/// Settings filename for persistence.
const SETTINGS_FILENAME: &str = "config.json";

/// Maximum number of recent files to track.
const MAX_RECENT_FILES: usize = 10;

/// Color settings for the chat panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    // Superchat tiers, cheapest first
    pub superchat_base: [u8; 3],
    pub superchat_200: [u8; 3],
    pub superchat_500: [u8; 3],
    pub superchat_2000: [u8; 3],
    pub superchat_5000: [u8; 3],
    pub superchat_10000: [u8; 3],
    pub superchat_50000: [u8; 3],

    // Author name colors
    pub owner: [u8; 3],
    pub moderator: [u8; 3],
    pub member: [u8; 3],
    pub viewer: [u8; 3],

    // Text colors
    /// Message timestamp color
    pub timestamp: [u8; 3],
    /// Message body color
    pub message_text: [u8; 3],

    // Status colors
    pub status_success: [u8; 3],
    pub status_error: [u8; 3],

    /// "Jump to latest" button fill
    pub jump_button: [u8; 3],
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            superchat_base: [30, 136, 229],    // Blue
            superchat_200: [0, 229, 255],      // Light blue
            superchat_500: [29, 233, 182],     // Teal
            superchat_2000: [255, 202, 40],    // Yellow
            superchat_5000: [245, 124, 0],     // Orange
            superchat_10000: [233, 30, 99],    // Magenta
            superchat_50000: [230, 33, 23],    // Red

            owner: [255, 214, 0],      // Gold
            moderator: [94, 132, 241], // Blue
            member: [43, 166, 64],     // Green
            viewer: [170, 170, 170],   // Gray

            timestamp: [128, 128, 128],
            message_text: [230, 230, 230],

            status_success: [76, 175, 80], // Green
            status_error: [244, 67, 54],   // Red

            jump_button: [62, 166, 255],
        }
    }
}

impl ColorSettings {
    /// Convert a color array to egui Color32.
    #[inline]
    pub fn to_color32(color: [u8; 3]) -> Color32 {
        Color32::from_rgb(color[0], color[1], color[2])
    }

    /// Background color for a superchat tier.
    pub fn superchat_color(&self, tier: SuperchatTier) -> Color32 {
        Self::to_color32(match tier {
            SuperchatTier::Base => self.superchat_base,
            SuperchatTier::From200 => self.superchat_200,
            SuperchatTier::From500 => self.superchat_500,
            SuperchatTier::From2000 => self.superchat_2000,
            SuperchatTier::From5000 => self.superchat_5000,
            SuperchatTier::From10000 => self.superchat_10000,
            SuperchatTier::From50000 => self.superchat_50000,
        })
    }

    /// Author name color for a role.
    pub fn role_color(&self, role: ChatRole) -> Color32 {
        Self::to_color32(match role {
            ChatRole::Owner => self.owner,
            ChatRole::Moderator => self.moderator,
            ChatRole::Member => self.member,
            ChatRole::Viewer => self.viewer,
        })
    }

    pub fn timestamp_color(&self) -> Color32 {
        Self::to_color32(self.timestamp)
    }

    pub fn message_text_color(&self) -> Color32 {
        Self::to_color32(self.message_text)
    }

    pub fn status_success_color(&self) -> Color32 {
        Self::to_color32(self.status_success)
    }

    pub fn status_error_color(&self) -> Color32 {
        Self::to_color32(self.status_error)
    }

    pub fn jump_button_color(&self) -> Color32 {
        Self::to_color32(self.jump_button)
    }
}

/// Application settings including colors and replay preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Color customization settings.
    #[serde(default)]
    pub colors: ColorSettings,

    /// Default playback speed (0.1 to 10.0).
    #[serde(default = "default_speed")]
    pub default_speed: f32,

    /// Seconds moved by the left/right arrow keys.
    #[serde(default = "default_seek_step")]
    pub seek_step_secs: u32,

    /// Distance from the bottom, in points, that still counts as following.
    #[serde(default = "default_follow_threshold")]
    pub follow_threshold_px: f32,

    /// Author name for messages typed in the composer.
    #[serde(default = "default_display_name")]
    pub display_name: String,

    /// Recently opened chat logs (most recent first).
    #[serde(default)]
    pub recent_files: Vec<PathBuf>,

    /// Window size to restore on startup (width, height).
    #[serde(default)]
    pub window_size: Option<(f32, f32)>,
}

fn default_speed() -> f32 {
    DEFAULT_SPEED
}

fn default_seek_step() -> u32 {
    DEFAULT_SEEK_STEP_SECS
}

fn default_follow_threshold() -> f32 {
    DEFAULT_FOLLOW_THRESHOLD
}

fn default_display_name() -> String {
    DEFAULT_DISPLAY_NAME.to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            colors: ColorSettings::default(),
            default_speed: default_speed(),
            seek_step_secs: default_seek_step(),
            follow_threshold_px: default_follow_threshold(),
            display_name: default_display_name(),
            recent_files: Vec::new(),
            window_size: None,
        }
    }
}

impl AppSettings {
    /// Get the settings file path in the user's config directory.
    fn get_settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push(APP_DIR_NAME);
            path.push(SETTINGS_FILENAME);
            path
        })
    }

    /// Load settings from disk, returning defaults if loading fails.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e.brief_description(), "using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from disk. A missing file yields defaults.
    pub fn try_load() -> Result<Self, AppError> {
        let Some(path) = Self::get_settings_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| AppError::SettingsLoadError {
            reason: format!("Failed to read {}: {}", path.display(), e),
        })?;
        Self::from_json(&content)
    }

    /// Parse settings from JSON.
    pub fn from_json(content: &str) -> Result<Self, AppError> {
        serde_json::from_str(content).map_err(|e| AppError::SettingsLoadError {
            reason: format!("Invalid settings file: {}", e),
        })
    }

    /// Save settings to disk.
    pub fn save(&self) -> Result<(), AppError> {
        let path = Self::get_settings_path().ok_or_else(|| AppError::SettingsSaveError {
            reason: "Could not determine config directory".to_string(),
        })?;

        // Ensure the parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::SettingsSaveError {
                reason: format!("Failed to create config directory: {}", e),
            })?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| AppError::SettingsSaveError {
                reason: format!("Failed to serialize settings: {}", e),
            })?;

        std::fs::write(&path, content).map_err(|e| AppError::SettingsSaveError {
            reason: format!("Failed to write settings file: {}", e),
        })?;

        Ok(())
    }

    /// Reset all settings to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Add a file to the recent files list.
    ///
    /// The file is moved to the front of the list. If it already exists, it is
    /// moved to the front. The list is capped at MAX_RECENT_FILES entries.
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    /// Clear the recent files list.
    pub fn clear_recent_files(&mut self) {
        self.recent_files.clear();
    }

    /// Get the default playback speed, clamped to valid range.
    pub fn get_default_speed(&self) -> f32 {
        self.default_speed.clamp(MIN_SPEED, MAX_SPEED)
    }

    /// Set the default playback speed.
    pub fn set_default_speed(&mut self, speed: f32) {
        self.default_speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Arrow-key seek step, at least one second.
    pub fn seek_step(&self) -> f64 {
        self.seek_step_secs.max(1) as f64
    }

    /// Set the window size.
    pub fn set_window_size(&mut self, width: f32, height: f32) {
        self.window_size = Some((width, height));
    }
}
