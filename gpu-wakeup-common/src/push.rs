//! Push webhook payload types.
//!
//! The webhook takes a single JSON document per notification:
//!
//! ```json
//! {
//!   "uuid": "...",
//!   "toUuid": "...",
//!   "userToken": "...",
//!   "type": "SvrmgrLangAI",
//!   "noti": {
//!     "notification": { "title": "...", "body": "...", "android_channel_id": "SvrmgrLangAI" },
//!     "data": { "openScreen": "true" }
//!   }
//! }
//! ```
//!
//! The body is truncated before sending; the webhook rejects oversized payloads.

use serde::{Deserialize, Serialize};

/// Notification type (and Android channel) used when none is given.
pub const DEFAULT_CHANNEL: &str = "SvrmgrLangAI";

/// Maximum number of characters kept in a notification body.
pub const DEFAULT_MAX_BODY_CHARS: usize = 850;

/// Sender/recipient credentials for the webhook.
#[derive(Clone, PartialEq, Eq)]
pub struct PushIdentity {
    pub uuid: String,
    pub to_uuid: String,
    pub user_token: String,
}

impl std::fmt::Debug for PushIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushIdentity")
            .field("uuid", &self.uuid)
            .field("to_uuid", &self.to_uuid)
            .field("user_token", &"[REDACTED]")
            .finish()
    }
}

/// Request body for the push webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    pub uuid: String,
    pub to_uuid: String,
    pub user_token: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub noti: PushNotification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotification {
    pub notification: PushNotificationBody,
    pub data: PushData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotificationBody {
    pub title: String,
    pub body: String,
    pub android_channel_id: String,
}

/// Extra data delivered with the notification. Values are strings on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushData {
    pub open_screen: String,
}

/// Error body the webhook returns on non-200 responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushRejection {
    #[serde(default)]
    pub message: Option<String>,
}

impl PushRequest {
    /// Build a request, truncating `body` to `max_body_chars` characters.
    pub fn new(
        identity: &PushIdentity,
        kind: &str,
        title: &str,
        body: &str,
        open_screen: bool,
        max_body_chars: usize,
    ) -> Self {
        Self {
            uuid: identity.uuid.clone(),
            to_uuid: identity.to_uuid.clone(),
            user_token: identity.user_token.clone(),
            kind: kind.to_string(),
            noti: PushNotification {
                notification: PushNotificationBody {
                    title: title.to_string(),
                    body: truncate_chars(body, max_body_chars).to_string(),
                    android_channel_id: kind.to_string(),
                },
                data: PushData {
                    open_screen: open_screen.to_string(),
                },
            },
        }
    }
}

/// Cut `s` to at most `max` characters without splitting a UTF-8 sequence.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
