//! Chat message data structures.
//!
//! This module defines the normalized chat message model shared by the
//! parser, the session and the chat panel, plus the presentation-facing
//! classifications derived from it (superchat tier, author role).

use serde::{Deserialize, Serialize};

use super::timestamp;

/// Paid highlight attached to a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Superchat {
    /// Currency-formatted amount exactly as exported (e.g. "¥12,000")
    pub amount: String,
    /// Message text shown inside the highlight
    pub message: String,
}

/// A single chat message positioned on the playback timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Playback-relative offset in seconds; negative before the stream began
    pub timestamp_sec: i64,
    /// Display text the offset was derived from
    pub timestamp_text: String,
    /// Plain text body (first text run only)
    pub message: String,
    /// Author display name, never empty
    pub username: String,
    /// Avatar URL
    #[serde(default)]
    pub user_icon: Option<String>,
    /// Present for paid messages
    #[serde(default)]
    pub superchat: Option<Superchat>,
    /// Tooltip of the author's first badge
    #[serde(default)]
    pub badge: Option<String>,
}

impl ChatMessage {
    /// Create a message typed locally at the given playback second.
    pub fn composed(username: impl Into<String>, text: impl Into<String>, at_sec: i64) -> Self {
        Self {
            timestamp_sec: at_sec,
            timestamp_text: timestamp::format(at_sec),
            message: text.into(),
            username: username.into(),
            user_icon: None,
            superchat: None,
            badge: None,
        }
    }

    /// Character shown in place of a missing avatar.
    pub fn avatar_initial(&self) -> char {
        self.username.chars().next().unwrap_or('?')
    }

    /// Role derived from the badge tooltip.
    pub fn role(&self) -> ChatRole {
        ChatRole::from_badge(self.badge.as_deref())
    }

    /// Colour tier for paid messages, `None` for ordinary chat.
    pub fn superchat_tier(&self) -> Option<SuperchatTier> {
        self.superchat
            .as_ref()
            .map(|sc| SuperchatTier::from_amount(&sc.amount))
    }
}

/// Author role, matched from badge tooltip text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    Owner,
    Moderator,
    Member,
    Viewer,
}

impl ChatRole {
    /// Classify a badge tooltip. Checked in owner, moderator, member order.
    pub fn from_badge(badge: Option<&str>) -> Self {
        let Some(badge) = badge else {
            return Self::Viewer;
        };

        let badge = badge.to_lowercase();
        if badge.contains("owner") {
            Self::Owner
        } else if badge.contains("moderator") {
            Self::Moderator
        } else if badge.contains("member") {
            Self::Member
        } else {
            Self::Viewer
        }
    }
}

/// Superchat colour band, ordered from cheapest to most expensive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SuperchatTier {
    /// Below 200
    Base,
    /// 200 and up
    From200,
    /// 500 and up
    From500,
    /// 2000 and up
    From2000,
    /// 5000 and up
    From5000,
    /// 10000 and up
    From10000,
    /// 50000 and up
    From50000,
}

impl SuperchatTier {
    /// Lower bounds paired with their tier, highest first.
    const THRESHOLDS: &'static [(f64, SuperchatTier)] = &[
        (50000.0, SuperchatTier::From50000),
        (10000.0, SuperchatTier::From10000),
        (5000.0, SuperchatTier::From5000),
        (2000.0, SuperchatTier::From2000),
        (500.0, SuperchatTier::From500),
        (200.0, SuperchatTier::From200),
    ];

    /// Classify a currency-formatted amount.
    ///
    /// Amounts without a readable number fall into `Base`. No currency
    /// conversion is applied.
    pub fn from_amount(amount: &str) -> Self {
        let value = parse_amount(amount).unwrap_or(0.0);
        Self::THRESHOLDS
            .iter()
            .find(|(min, _)| value >= *min)
            .map(|(_, tier)| *tier)
            .unwrap_or(Self::Base)
    }
}

/// Extract the numeric value of an amount such as "¥12,000" or "$5.00".
///
/// Currency symbols before the first digit and `,` separators are dropped,
/// then the leading `digits[.digits]` run is parsed.
pub fn parse_amount(amount: &str) -> Option<f64> {
    let start = amount.find(|c: char| c.is_ascii_digit())?;
    let number: String = amount[start..]
        .chars()
        .filter(|c| *c != ',')
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    number.trim_end_matches('.').parse::<f64>().ok()
}
