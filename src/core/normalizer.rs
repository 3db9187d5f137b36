//! Normalization of live-chat replay records into `ChatMessage`s.
//!
//! Each line of a replay export is one `replayChatItemAction` record. Only
//! text and paid message items become messages; every other record shape is
//! rejected without error so that exports mixing in membership, sticker or
//! banner events still load.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::chat::{ChatMessage, Superchat};
use super::timestamp::{self, TimestampError};

/// Errors for records that matched a message item but could not be converted.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A required field was missing or had the wrong JSON type
    #[error("Invalid message item: {0}")]
    Shape(#[from] serde_json::Error),

    /// A required field was present but empty
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    /// The timestamp text could not be parsed
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

// ============================================================================
// Intermediate JSON structures for deserialization
// ============================================================================

/// The two item variants that carry a chat message.
#[derive(Debug)]
enum MessageItem<'a> {
    /// `liveChatTextMessageRenderer`
    Text(&'a Value),
    /// `liveChatPaidMessageRenderer`
    Paid(&'a Value),
}

impl<'a> MessageItem<'a> {
    fn renderer(&self) -> &'a Value {
        match self {
            Self::Text(renderer) | Self::Paid(renderer) => renderer,
        }
    }
}

/// Fields shared by text and paid message renderers.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRenderer {
    message: RawMessage,
    author_name: RawSimpleText,
    timestamp_text: RawSimpleText,
    #[serde(default)]
    author_photo: Option<RawThumbnails>,
    #[serde(default)]
    purchase_amount_text: Option<RawSimpleText>,
    #[serde(default)]
    author_badges: Vec<RawBadge>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    runs: Vec<RawRun>,
}

/// One run of a message; emoji runs have no `text`.
#[derive(Debug, Deserialize)]
struct RawRun {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSimpleText {
    simple_text: String,
}

#[derive(Debug, Deserialize)]
struct RawThumbnails {
    #[serde(default)]
    thumbnails: Vec<RawThumbnail>,
}

#[derive(Debug, Deserialize)]
struct RawThumbnail {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBadge {
    #[serde(default)]
    live_chat_author_badge_renderer: Option<RawBadgeRenderer>,
}

#[derive(Debug, Deserialize)]
struct RawBadgeRenderer {
    #[serde(default)]
    tooltip: Option<String>,
}

// ============================================================================
// Normalizer implementation
// ============================================================================

/// Convert one decoded replay record into a `ChatMessage`.
///
/// # Returns
/// * `Ok(Some(message))` - The record is a text or paid chat message
/// * `Ok(None)` - The record is some other event and carries no message
/// * `Err(NormalizeError)` - The record is a message item with bad fields
pub fn normalize(record: &Value) -> Result<Option<ChatMessage>, NormalizeError> {
    let Some(item) = find_message_item(record) else {
        return Ok(None);
    };

    let renderer = RawRenderer::deserialize(item.renderer())?;
    let is_paid = matches!(item, MessageItem::Paid(_));

    // Emoji-led messages have no text in the first run and keep an empty body
    let message = renderer
        .message
        .runs
        .into_iter()
        .next()
        .ok_or(NormalizeError::MissingField {
            field: "message.runs[0]",
        })?
        .text
        .unwrap_or_default();

    let username = renderer.author_name.simple_text;
    if username.is_empty() {
        return Err(NormalizeError::MissingField {
            field: "authorName.simpleText",
        });
    }

    let timestamp_text = renderer.timestamp_text.simple_text;
    let timestamp_sec = timestamp::parse(&timestamp_text)?;

    let user_icon = renderer
        .author_photo
        .and_then(|photo| photo.thumbnails.into_iter().next())
        .and_then(|thumb| thumb.url);

    // A paid renderer without an amount is kept as plain chat
    let superchat = renderer.purchase_amount_text.map(|amount| Superchat {
        amount: amount.simple_text,
        message: message.clone(),
    });
    if is_paid && superchat.is_none() {
        tracing::debug!(%username, "paid message item without purchase amount");
    }

    let badge = renderer
        .author_badges
        .into_iter()
        .next()
        .and_then(|badge| badge.live_chat_author_badge_renderer)
        .and_then(|renderer| renderer.tooltip);

    Ok(Some(ChatMessage {
        timestamp_sec,
        timestamp_text,
        message,
        username,
        user_icon,
        superchat,
        badge,
    }))
}

/// Walk `replayChatItemAction.actions[0].addChatItemAction.item` and pick the
/// message variant.
fn find_message_item(record: &Value) -> Option<MessageItem<'_>> {
    let item = record
        .get("replayChatItemAction")?
        .get("actions")?
        .get(0)?
        .get("addChatItemAction")?
        .get("item")?;

    if let Some(renderer) = item.get("liveChatTextMessageRenderer") {
        Some(MessageItem::Text(renderer))
    } else {
        item.get("liveChatPaidMessageRenderer")
            .map(MessageItem::Paid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wrap_item(item: Value) -> Value {
        json!({
            "replayChatItemAction": {
                "actions": [{ "addChatItemAction": { "item": item } }]
            }
        })
    }

    fn text_renderer() -> Value {
        json!({
            "message": { "runs": [{ "text": "hello" }] },
            "authorName": { "simpleText": "Alice" },
            "timestampText": { "simpleText": "01:05" },
            "authorPhoto": { "thumbnails": [{ "url": "http://x/a.png" }] }
        })
    }

    #[test]
    fn test_normalize_text_message() {
        let line = r#"{"replayChatItemAction":{"actions":[{"addChatItemAction":{"item":{"liveChatTextMessageRenderer":{"message":{"runs":[{"text":"hello"}]},"authorName":{"simpleText":"Alice"},"timestampText":{"simpleText":"01:05"},"authorPhoto":{"thumbnails":[{"url":"http://x/a.png"}]}}}}}]}}"#;
        let record: Value = serde_json::from_str(line).unwrap();

        let msg = normalize(&record).unwrap().unwrap();
        assert_eq!(
            msg,
            ChatMessage {
                timestamp_sec: 65,
                timestamp_text: "01:05".to_string(),
                message: "hello".to_string(),
                username: "Alice".to_string(),
                user_icon: Some("http://x/a.png".to_string()),
                superchat: None,
                badge: None,
            }
        );
    }

    #[test]
    fn test_normalize_paid_message() {
        let mut renderer = text_renderer();
        renderer["purchaseAmountText"] = json!({ "simpleText": "¥12,000" });
        renderer["timestampText"] = json!({ "simpleText": "1:00:00" });
        let record = wrap_item(json!({ "liveChatPaidMessageRenderer": renderer }));

        let msg = normalize(&record).unwrap().unwrap();
        assert_eq!(msg.timestamp_sec, 3600);
        let superchat = msg.superchat.unwrap();
        assert_eq!(superchat.amount, "¥12,000");
        assert_eq!(superchat.message, "hello");
    }

    #[test]
    fn test_normalize_first_run_only() {
        let mut renderer = text_renderer();
        renderer["message"] = json!({
            "runs": [{ "text": "first " }, { "emoji": { "emojiId": "x" } }, { "text": "rest" }]
        });
        let record = wrap_item(json!({ "liveChatTextMessageRenderer": renderer }));

        let msg = normalize(&record).unwrap().unwrap();
        assert_eq!(msg.message, "first ");
    }

    #[test]
    fn test_normalize_badge() {
        let mut renderer = text_renderer();
        renderer["authorBadges"] = json!([
            { "liveChatAuthorBadgeRenderer": { "tooltip": "Moderator" } },
            { "liveChatAuthorBadgeRenderer": { "tooltip": "Member (1 year)" } }
        ]);
        let record = wrap_item(json!({ "liveChatTextMessageRenderer": renderer }));

        let msg = normalize(&record).unwrap().unwrap();
        assert_eq!(msg.badge.as_deref(), Some("Moderator"));
    }

    #[test]
    fn test_normalize_empty_badges_and_no_photo() {
        let mut renderer = text_renderer();
        renderer["authorBadges"] = json!([]);
        renderer.as_object_mut().unwrap().remove("authorPhoto");
        let record = wrap_item(json!({ "liveChatTextMessageRenderer": renderer }));

        let msg = normalize(&record).unwrap().unwrap();
        assert!(msg.badge.is_none());
        assert!(msg.user_icon.is_none());
    }

    #[test]
    fn test_normalize_badge_without_tooltip() {
        let mut renderer = text_renderer();
        renderer["authorBadges"] = json!([{ "liveChatAuthorBadgeRenderer": {} }]);
        let record = wrap_item(json!({ "liveChatTextMessageRenderer": renderer }));

        let msg = normalize(&record).unwrap().unwrap();
        assert!(msg.badge.is_none());
    }

    #[test]
    fn test_normalize_rejects_foreign_records() {
        assert!(normalize(&json!({})).unwrap().is_none());
        assert!(normalize(&json!([1, 2, 3])).unwrap().is_none());
        assert!(
            normalize(&json!({ "replayChatItemAction": { "actions": [] } }))
                .unwrap()
                .is_none()
        );
        assert!(
            normalize(&json!({
                "replayChatItemAction": { "actions": [{ "markChatItemAsDeletedAction": {} }] }
            }))
            .unwrap()
            .is_none()
        );
        let membership = wrap_item(json!({ "liveChatMembershipItemRenderer": {} }));
        assert!(normalize(&membership).unwrap().is_none());
    }

    #[test]
    fn test_normalize_missing_required_field() {
        let mut renderer = text_renderer();
        renderer.as_object_mut().unwrap().remove("authorName");
        let record = wrap_item(json!({ "liveChatTextMessageRenderer": renderer }));

        assert!(matches!(normalize(&record), Err(NormalizeError::Shape(_))));
    }

    #[test]
    fn test_normalize_emoji_led_message_is_kept() {
        let mut renderer = text_renderer();
        renderer["message"] = json!({
            "runs": [{ "emoji": { "emojiId": "x" } }, { "text": " lol" }]
        });
        let record = wrap_item(json!({ "liveChatTextMessageRenderer": renderer }));

        let msg = normalize(&record).unwrap().unwrap();
        assert_eq!(msg.message, "");
        assert_eq!(msg.username, "Alice");
    }

    #[test]
    fn test_normalize_empty_runs() {
        let mut renderer = text_renderer();
        renderer["message"] = json!({ "runs": [] });
        let record = wrap_item(json!({ "liveChatTextMessageRenderer": renderer }));

        assert!(matches!(
            normalize(&record),
            Err(NormalizeError::MissingField {
                field: "message.runs[0]"
            })
        ));
    }

    #[test]
    fn test_normalize_empty_username() {
        let mut renderer = text_renderer();
        renderer["authorName"] = json!({ "simpleText": "" });
        let record = wrap_item(json!({ "liveChatTextMessageRenderer": renderer }));

        assert!(matches!(
            normalize(&record),
            Err(NormalizeError::MissingField {
                field: "authorName.simpleText"
            })
        ));
    }

    #[test]
    fn test_normalize_malformed_timestamp() {
        let mut renderer = text_renderer();
        renderer["timestampText"] = json!({ "simpleText": "soon" });
        let record = wrap_item(json!({ "liveChatTextMessageRenderer": renderer }));

        assert!(matches!(
            normalize(&record),
            Err(NormalizeError::Timestamp(_))
        ));
    }

    #[test]
    fn test_normalize_negative_timestamp() {
        let mut renderer = text_renderer();
        renderer["timestampText"] = json!({ "simpleText": "-0:30" });
        let record = wrap_item(json!({ "liveChatTextMessageRenderer": renderer }));

        let msg = normalize(&record).unwrap().unwrap();
        assert_eq!(msg.timestamp_sec, -30);
        assert_eq!(msg.timestamp_text, "-0:30");
    }
}
