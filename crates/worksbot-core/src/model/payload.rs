//! Outbound reply payloads.
//!
//! ```text
//! ReplyPayload { target, content? }          produced by the dispatcher
//!        │ into_envelope(bot_no)
//!        ▼
//! PushEnvelope { botNo, roomId|accountId, content? }   sent on the wire
//! ```

use serde::{Deserialize, Serialize};

use crate::model::content::ReplyContent;

/// Where a reply goes.
///
/// Serializes as a single `roomId` or `accountId` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplyTarget {
    #[serde(rename = "roomId")]
    Room(String),
    #[serde(rename = "accountId")]
    Account(String),
}

impl ReplyTarget {
    pub fn room(room_id: impl Into<String>) -> Self {
        ReplyTarget::Room(room_id.into())
    }

    pub fn account(account_id: impl Into<String>) -> Self {
        ReplyTarget::Account(account_id.into())
    }

    /// The room or account identifier.
    pub fn id(&self) -> &str {
        match self {
            ReplyTarget::Room(id) | ReplyTarget::Account(id) => id,
        }
    }

    pub fn is_room(&self) -> bool {
        matches!(self, ReplyTarget::Room(_))
    }
}

/// The dispatcher's decision for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyPayload {
    #[serde(flatten)]
    pub target: ReplyTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ReplyContent>,
}

impl ReplyPayload {
    /// A payload with a target and no content yet.
    pub fn new(target: ReplyTarget) -> Self {
        Self {
            target,
            content: None,
        }
    }

    pub fn with_content(mut self, content: ReplyContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Wraps the payload with the bot number for delivery.
    pub fn into_envelope(self, bot_no: u64) -> PushEnvelope {
        PushEnvelope {
            bot_no,
            target: self.target,
            content: self.content,
        }
    }
}

/// Request body of a message push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushEnvelope {
    pub bot_no: u64,
    #[serde(flatten)]
    pub target: ReplyTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ReplyContent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_without_content() {
        let payload = ReplyPayload::new(ReplyTarget::room("r9"));
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!({"roomId": "r9"}));
        assert!(!payload.has_content());
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = ReplyPayload::new(ReplyTarget::account("a1"))
            .with_content(ReplyContent::text("hello"))
            .into_envelope(1234);

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "botNo": 1234,
                "accountId": "a1",
                "content": {"type": "text", "text": "hello"}
            })
        );
    }

    #[test]
    fn test_target_accessors() {
        let target = ReplyTarget::room("r1");
        assert_eq!(target.id(), "r1");
        assert!(target.is_room());
        assert!(!ReplyTarget::account("a1").is_room());
    }
}
