//! Application error types for user-facing error handling.
//!
//! This module defines error types that are designed to be displayed to users
//! in error dialogs, with detailed information and recovery options.

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::parser::ParseError;

/// Application-level errors that can be displayed to users.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// File was not found at the specified path
    #[error("File not found")]
    FileNotFound {
        /// Path to the file that was not found
        path: PathBuf,
    },

    /// File exists but cannot be read (permissions, encoding, etc.)
    #[error("Cannot read file")]
    FileReadError {
        /// Path to the file that could not be read
        path: PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// File extension is not recognized
    #[error("Unsupported file type")]
    UnsupportedFileType {
        /// Path to the file
        path: PathBuf,
        /// Expected file extensions
        expected: Vec<String>,
    },

    /// The file was read but no line produced a chat message
    #[error("No valid chat messages")]
    NoValidMessages {
        /// Path to the file, if it came from disk
        path: Option<PathBuf>,
        /// Non-blank lines examined
        total_lines: usize,
        /// Lines skipped as unreadable or foreign
        skipped: usize,
    },

    /// Settings could not be saved
    #[error("Settings save error")]
    SettingsSaveError {
        /// Description of the failure
        reason: String,
    },

    /// Settings could not be loaded
    #[error("Settings load error")]
    SettingsLoadError {
        /// Description of the failure
        reason: String,
    },
}

impl AppError {
    /// Returns true if the error is recoverable (user can continue using the app).
    ///
    /// Every current variant leaves the previously loaded chat intact.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::FileReadError { .. }
                | Self::UnsupportedFileType { .. }
                | Self::NoValidMessages { .. }
                | Self::SettingsSaveError { .. }
                | Self::SettingsLoadError { .. }
        )
    }

    /// Returns true if this error supports retry operation.
    ///
    /// Read failures can be retried after the user fixes the underlying
    /// issue; a file without chat messages will not change on retry.
    pub fn supports_retry(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. } | Self::FileReadError { .. }
        )
    }

    /// Get the file path associated with this error, if any.
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::FileNotFound { path } => Some(path),
            Self::FileReadError { path, .. } => Some(path),
            Self::UnsupportedFileType { path, .. } => Some(path),
            Self::NoValidMessages { path, .. } => path.as_ref(),
            Self::SettingsSaveError { .. } | Self::SettingsLoadError { .. } => None,
        }
    }

    /// Get the title for the error dialog.
    pub fn dialog_title(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => "File Not Found",
            Self::FileReadError { .. } => "Cannot Read File",
            Self::UnsupportedFileType { .. } => "Unsupported File Type",
            Self::NoValidMessages { .. } => "No Chat Messages",
            Self::SettingsSaveError { .. } => "Settings Error",
            Self::SettingsLoadError { .. } => "Settings Error",
        }
    }

    /// Get a brief description of the error suitable for display.
    pub fn brief_description(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("The file '{}' could not be found.", display_name(path))
            }
            Self::FileReadError { path, .. } => {
                format!("Could not read the file '{}'.", display_name(path))
            }
            Self::UnsupportedFileType { expected, .. } => {
                format!(
                    "Please use a chat log with one of these extensions: {}",
                    expected.join(", ")
                )
            }
            Self::NoValidMessages { .. } => {
                "No chat messages were found. Is this a live chat replay export?".to_string()
            }
            Self::SettingsSaveError { reason } => format!("Could not save settings: {}", reason),
            Self::SettingsLoadError { reason } => format!("Could not load settings: {}", reason),
        }
    }

    /// Get detailed error information for technical support / bug reports.
    pub fn detailed_info(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Error Type: {}", self.dialog_title()));
        lines.push(format!("Description: {}", self.brief_description()));

        match self {
            Self::FileNotFound { path } => {
                lines.push(format!("Full Path: {}", path.display()));
            }
            Self::FileReadError { path, reason } => {
                lines.push(format!("Full Path: {}", path.display()));
                lines.push(format!("Reason: {}", reason));
            }
            Self::UnsupportedFileType { path, expected } => {
                lines.push(format!("File: {}", path.display()));
                lines.push(format!("Supported Extensions: {}", expected.join(", ")));
            }
            Self::NoValidMessages {
                path,
                total_lines,
                skipped,
            } => {
                if let Some(p) = path {
                    lines.push(format!("File: {}", p.display()));
                }
                lines.push(format!("Lines Examined: {}", total_lines));
                lines.push(format!("Lines Skipped: {}", skipped));
            }
            Self::SettingsSaveError { reason } | Self::SettingsLoadError { reason } => {
                lines.push(format!("Details: {}", reason));
            }
        }

        lines.join("\n")
    }
}

/// File name for messages, falling back to the full path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Create an AppError from a file path and I/O error.
pub fn from_io_error(path: PathBuf, error: std::io::Error) -> AppError {
    match error.kind() {
        std::io::ErrorKind::NotFound => AppError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => AppError::FileReadError {
            path,
            reason: "Permission denied".to_string(),
        },
        std::io::ErrorKind::InvalidData => AppError::FileReadError {
            path,
            reason: "File is not valid UTF-8 text".to_string(),
        },
        _ => AppError::FileReadError {
            path,
            reason: error.to_string(),
        },
    }
}

/// Create an AppError from a parse error with optional path context.
pub fn from_parse_error(path: Option<PathBuf>, error: &ParseError) -> AppError {
    match error {
        ParseError::NoValidMessages {
            total_lines,
            skipped,
        } => AppError::NoValidMessages {
            path,
            total_lines: *total_lines,
            skipped: *skipped,
        },
    }
}
