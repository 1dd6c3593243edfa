//! Inbound callback events.
//!
//! # Event Hierarchy
//!
//! ```text
//! CallbackEvent { source, created_time }
//! ├── message   { content: MessageContent }
//! │   ├── text      { text, postback? }
//! │   ├── location  { address, latitude, longitude }
//! │   ├── sticker   { packageId, stickerId }
//! │   └── image     { resourceId }
//! ├── join
//! ├── leave
//! ├── joined    { memberList }
//! ├── left      { memberList }
//! └── postback  { data }
//! ```
//!
//! # Parsing
//!
//! [`parse_callback_event`] inspects `type` (and `content.type` for messages)
//! in the raw JSON and builds the matching variant. Discriminators it does not
//! know are kept as [`EventKind::Unknown`] / [`MessageContent::Unknown`] so the
//! dispatcher can classify them as unhandled instead of failing the request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EventError, EventResult};
use crate::model::payload::ReplyTarget;

// ============================================================================
// Source
// ============================================================================

/// Where the event happened.
///
/// A `roomId` means a multi-member room; without one the event comes from a
/// 1:1 chat with `accountId`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Member account that triggered the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Room the event belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}

impl Source {
    /// A source inside a room.
    pub fn room(room_id: impl Into<String>) -> Self {
        Self {
            account_id: None,
            room_id: Some(room_id.into()),
        }
    }

    /// A source in a direct chat.
    pub fn account(account_id: impl Into<String>) -> Self {
        Self {
            account_id: Some(account_id.into()),
            room_id: None,
        }
    }

    /// Resolves the reply target. A room always wins over the account.
    ///
    /// Empty ids count as absent.
    pub fn reply_target(&self) -> Option<ReplyTarget> {
        match (non_empty(&self.room_id), non_empty(&self.account_id)) {
            (Some(room), _) => Some(ReplyTarget::room(room)),
            (None, Some(account)) => Some(ReplyTarget::account(account)),
            (None, None) => None,
        }
    }

    /// Returns whether the event happened in a multi-member room.
    pub fn is_room(&self) -> bool {
        non_empty(&self.room_id).is_some()
    }
}

fn non_empty(id: &Option<String>) -> Option<&str> {
    id.as_deref().filter(|s| !s.is_empty())
}

// ============================================================================
// Message content
// ============================================================================

/// Text message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// The visible text.
    pub text: String,
    /// Token attached by the element that produced the message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postback: Option<String>,
}

/// Shared location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationContent {
    #[serde(default)]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Sticker reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerContent {
    pub package_id: String,
    pub sticker_id: String,
}

/// Uploaded image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    pub resource_id: String,
}

/// Body of a `message` event, keyed by `content.type`.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(TextContent),
    Location(LocationContent),
    Sticker(StickerContent),
    Image(ImageContent),
    /// A content type this adapter does not understand.
    Unknown(String),
}

impl MessageContent {
    /// Returns the `content.type` discriminator.
    pub fn content_type(&self) -> &str {
        match self {
            MessageContent::Text(_) => "text",
            MessageContent::Location(_) => "location",
            MessageContent::Sticker(_) => "sticker",
            MessageContent::Image(_) => "image",
            MessageContent::Unknown(t) => t,
        }
    }

    /// Convenience constructor for a text message.
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text(TextContent {
            text: text.into(),
            postback: None,
        })
    }

    /// Convenience constructor for a text message with a postback token.
    pub fn text_with_postback(text: impl Into<String>, postback: impl Into<String>) -> Self {
        MessageContent::Text(TextContent {
            text: text.into(),
            postback: Some(postback.into()),
        })
    }
}

// ============================================================================
// CallbackEvent
// ============================================================================

/// Event-specific part of a callback, keyed by the top-level `type`.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A member sent a message.
    Message(MessageContent),
    /// The bot was invited into a room.
    Join,
    /// The bot left (or was removed from) a room.
    Leave,
    /// Members joined a room the bot is in.
    Joined(Vec<String>),
    /// Members left a room the bot is in.
    Left(Vec<String>),
    /// An interactive element was activated; carries its data token.
    Postback(String),
    /// An event type this adapter does not understand.
    Unknown(String),
}

impl EventKind {
    /// Returns the `type` discriminator.
    pub fn event_type(&self) -> &str {
        match self {
            EventKind::Message(_) => "message",
            EventKind::Join => "join",
            EventKind::Leave => "leave",
            EventKind::Joined(_) => "joined",
            EventKind::Left(_) => "left",
            EventKind::Postback(_) => "postback",
            EventKind::Unknown(t) => t,
        }
    }
}

/// A decoded callback event.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackEvent {
    /// Where the event happened.
    pub source: Source,
    /// Platform timestamp in milliseconds, when supplied.
    pub created_time: Option<i64>,
    /// Type-specific data.
    pub kind: EventKind,
}

impl CallbackEvent {
    /// Creates an event from its parts.
    pub fn new(source: Source, kind: EventKind) -> Self {
        Self {
            source,
            created_time: None,
            kind,
        }
    }

    /// Returns the `type` discriminator.
    pub fn event_type(&self) -> &str {
        self.kind.event_type()
    }

    /// Parses a raw callback body.
    pub fn parse(raw: &[u8]) -> EventResult<Self> {
        parse_callback_event(raw)
    }
}

#[derive(Deserialize)]
struct MemberList {
    #[serde(default, rename = "memberList")]
    member_list: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct PostbackData {
    #[serde(default)]
    data: String,
}

/// Parses a raw callback body into the most specific [`CallbackEvent`].
pub fn parse_callback_event(raw: &[u8]) -> EventResult<CallbackEvent> {
    // Pre-parse to extract type discriminators
    let v: Value = serde_json::from_slice(raw)?;

    let source: Source = match v.get("source") {
        Some(s) => serde_json::from_value(s.clone())?,
        None => return Err(EventError::MissingSource),
    };
    if source.reply_target().is_none() {
        return Err(EventError::EmptySource);
    }

    let created_time = v.get("createdTime").and_then(Value::as_i64);
    let event_type = v
        .get("type")
        .and_then(Value::as_str)
        .ok_or(EventError::MissingType)?;

    let kind = match event_type {
        "message" => EventKind::Message(parse_message_content(&v)?),
        "join" => EventKind::Join,
        "leave" => EventKind::Leave,
        "joined" => {
            let members: MemberList = serde_json::from_value(v.clone())?;
            EventKind::Joined(members.member_list.unwrap_or_default())
        }
        "left" => {
            let members: MemberList = serde_json::from_value(v.clone())?;
            EventKind::Left(members.member_list.unwrap_or_default())
        }
        "postback" => {
            let postback: PostbackData = serde_json::from_value(v.clone())?;
            EventKind::Postback(postback.data)
        }
        other => EventKind::Unknown(other.to_string()),
    };

    Ok(CallbackEvent {
        source,
        created_time,
        kind,
    })
}

fn parse_message_content(v: &Value) -> EventResult<MessageContent> {
    let Some(content) = v.get("content") else {
        return Ok(MessageContent::Unknown(String::new()));
    };
    let content_type = content.get("type").and_then(Value::as_str).unwrap_or("");

    macro_rules! decode {
        ($variant:ident) => {
            MessageContent::$variant(serde_json::from_value(content.clone())?)
        };
    }

    Ok(match content_type {
        "text" => decode!(Text),
        "location" => decode!(Location),
        "sticker" => decode!(Sticker),
        "image" => decode!(Image),
        other => MessageContent::Unknown(other.to_string()),
    })
}
