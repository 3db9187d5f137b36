//! Line-delimited JSON parser for live-chat replay exports (.jsonl / .txt).
//!
//! This module turns the full text of an export into a time-ordered
//! `ChatMessage` sequence. Bad lines are reported and skipped; only an
//! export with no usable line at all is an error.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use super::chat::ChatMessage;
use super::normalizer::{self, NormalizeError};

/// Errors that fail a whole chat log load.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The text contained no line that produced a message
    #[error("No valid chat messages found ({skipped} of {total_lines} lines skipped)")]
    NoValidMessages { total_lines: usize, skipped: usize },
}

/// Why a single line was skipped.
#[derive(Debug)]
pub enum LineIssue {
    /// The line is not valid JSON
    Json(serde_json::Error),
    /// Valid JSON that is not a chat message record
    NotAMessage,
    /// A message record with unusable fields
    Normalize(NormalizeError),
}

impl fmt::Display for LineIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "invalid JSON: {}", e),
            Self::NotAMessage => write!(f, "not a chat message record"),
            Self::Normalize(e) => write!(f, "{}", e),
        }
    }
}

/// A skipped line and the reason it was skipped.
#[derive(Debug)]
pub struct LineWarning {
    /// 1-indexed line number in the original text
    pub line: usize,
    pub issue: LineIssue,
}

/// Result of a successful parse.
#[derive(Debug)]
pub struct ParsedLog {
    /// Messages sorted ascending by `timestamp_sec`
    pub messages: Vec<ChatMessage>,
    /// Lines that were skipped, in file order
    pub warnings: Vec<LineWarning>,
    /// Number of non-blank lines examined
    pub total_lines: usize,
}

/// Parse the contents of a replay export.
///
/// # Arguments
/// * `content` - Full UTF-8 text of the export
///
/// # Returns
/// * `Ok(ParsedLog)` - At least one message was produced
/// * `Err(ParseError::NoValidMessages)` - Every non-blank line was skipped
pub fn parse_chat_log(content: &str) -> Result<ParsedLog, ParseError> {
    let mut messages = Vec::new();
    let mut warnings = Vec::new();
    let mut total_lines = 0;

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        total_lines += 1;

        match parse_line(line) {
            Ok(message) => messages.push(message),
            Err(issue) => warnings.push(LineWarning {
                line: index + 1,
                issue,
            }),
        }
    }

    if messages.is_empty() {
        return Err(ParseError::NoValidMessages {
            total_lines,
            skipped: warnings.len(),
        });
    }

    // Stable, so equal timestamps keep file order
    messages.sort_by_key(|m| m.timestamp_sec);

    Ok(ParsedLog {
        messages,
        warnings,
        total_lines,
    })
}

/// Decode and normalize one non-blank line.
fn parse_line(line: &str) -> Result<ChatMessage, LineIssue> {
    let record: Value = serde_json::from_str(line).map_err(LineIssue::Json)?;
    normalizer::normalize(&record)
        .map_err(LineIssue::Normalize)?
        .ok_or(LineIssue::NotAMessage)
}
