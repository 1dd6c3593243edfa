//! Event classification.
//!
//! The [`Dispatcher`] maps one [`CallbackEvent`] to at most one
//! [`ReplyPayload`]. It holds no state between events.
//!
//! # Decision table
//!
//! ```text
//! message/text      postback == "start"        → welcome
//!                   token selects a template   → catalog content
//!                   otherwise                  → fallback echo
//! message/location                             → "address:..\nlat:..\nlon:.."
//! message/sticker                              → same sticker
//! message/image                                → same image
//! message/<other>                              → unhandled
//! join                                         → greeting
//! leave                                        → payload, no content
//! joined / left                                → "<u1,u2,..> <suffix>"
//! postback          token selects a template   → catalog content
//!                   otherwise                  → payload, no content
//! <other>                                      → unhandled
//! ```
//!
//! The reply target is resolved first: a room when the source has one,
//! otherwise the member's account.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::TemplateCatalog;
use crate::matcher::match_kind;
use crate::model::{CallbackEvent, EventKind, MessageContent, ReplyContent, ReplyPayload};
use crate::replies::Replies;

/// Postback the platform attaches to the "start" button of a new chat.
pub const START_POSTBACK: &str = "start";

/// Behaviour switches of the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchFeatures {
    /// Selects catalog templates by token. When off, text is always echoed
    /// and postback events get no content.
    pub enable_templates: bool,
}

impl Default for DispatchFeatures {
    fn default() -> Self {
        Self {
            enable_templates: true,
        }
    }
}

/// Maps callback events to reply payloads.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    features: DispatchFeatures,
    replies: Replies,
    catalog: TemplateCatalog,
}

impl Dispatcher {
    pub fn new(features: DispatchFeatures, replies: Replies, image_host: impl Into<String>) -> Self {
        let catalog = TemplateCatalog::new(image_host, &replies);
        Self {
            features,
            replies,
            catalog,
        }
    }

    pub fn features(&self) -> DispatchFeatures {
        self.features
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn replies(&self) -> &Replies {
        &self.replies
    }

    /// Decides the reply for `event`.
    ///
    /// `None` means the event is unhandled. A payload without content means
    /// the event is understood but has nothing to say.
    pub fn classify(&self, event: &CallbackEvent) -> Option<ReplyPayload> {
        let Some(target) = event.source.reply_target() else {
            debug!(event_type = event.event_type(), "event has no reply target");
            return None;
        };
        let payload = ReplyPayload::new(target);

        let content = match &event.kind {
            EventKind::Message(content) => match self.message_reply(content) {
                Some(reply) => Some(reply),
                None => {
                    debug!(
                        content_type = content.content_type(),
                        "unhandled message content"
                    );
                    return None;
                }
            },
            EventKind::Join => Some(ReplyContent::text(&self.replies.join_greeting)),
            EventKind::Leave => None,
            EventKind::Joined(members) => Some(ReplyContent::text(self.replies.joined(members))),
            EventKind::Left(members) => Some(ReplyContent::text(self.replies.left(members))),
            EventKind::Postback(data) => self.template_for(&[Some(data.as_str())]),
            EventKind::Unknown(event_type) => {
                debug!(event_type = %event_type, "unhandled event type");
                return None;
            }
        };

        Some(match content {
            Some(content) => payload.with_content(content),
            None => payload,
        })
    }

    /// Content for a `message` event, or `None` for unknown content types.
    fn message_reply(&self, content: &MessageContent) -> Option<ReplyContent> {
        match content {
            MessageContent::Text(text) => {
                if text.postback.as_deref() == Some(START_POSTBACK) {
                    return Some(ReplyContent::text(&self.replies.welcome));
                }
                let reply = self
                    .template_for(&[text.postback.as_deref(), Some(text.text.as_str())])
                    .unwrap_or_else(|| ReplyContent::text(self.replies.fallback(&text.text)));
                Some(reply)
            }
            MessageContent::Location(location) => Some(ReplyContent::text(Replies::location(
                &location.address,
                location.latitude,
                location.longitude,
            ))),
            MessageContent::Sticker(sticker) => Some(ReplyContent::sticker(
                &sticker.package_id,
                &sticker.sticker_id,
            )),
            MessageContent::Image(image) => Some(ReplyContent::image(&image.resource_id)),
            MessageContent::Unknown(_) => None,
        }
    }

    fn template_for(&self, candidates: &[Option<&str>]) -> Option<ReplyContent> {
        if !self.features.enable_templates {
            return None;
        }
        match_kind(candidates).map(|kind| self.catalog.build(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReplyTarget, Source};

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            DispatchFeatures::default(),
            Replies::default(),
            "https://img.example.com",
        )
    }

    fn text(text: &str) -> CallbackEvent {
        CallbackEvent::new(
            Source::account("a1"),
            EventKind::Message(MessageContent::text(text)),
        )
    }

    #[test]
    fn test_start_postback_wins() {
        let event = CallbackEvent::new(
            Source::account("a1"),
            EventKind::Message(MessageContent::text_with_postback("b", START_POSTBACK)),
        );
        let payload = dispatcher().classify(&event).unwrap();
        assert_eq!(
            payload.content,
            Some(ReplyContent::text(Replies::default().welcome))
        );
    }

    #[test]
    fn test_fallback_echo() {
        let payload = dispatcher().classify(&text("hello there")).unwrap();
        let reply = payload.content.unwrap();
        assert!(reply.as_text().unwrap().contains("hello there"));
    }

    #[test]
    fn test_templates_disabled() {
        let dispatcher = Dispatcher::new(
            DispatchFeatures {
                enable_templates: false,
            },
            Replies::default(),
            "https://img.example.com",
        );

        let payload = dispatcher.classify(&text("c")).unwrap();
        assert_eq!(payload.content.unwrap().content_type(), "text");

        let postback = CallbackEvent::new(Source::room("r1"), EventKind::Postback("carousel".into()));
        let payload = dispatcher.classify(&postback).unwrap();
        assert_eq!(payload.target, ReplyTarget::room("r1"));
        assert!(payload.content.is_none());
    }

    #[test]
    fn test_unknown_content_is_unhandled() {
        let event = CallbackEvent::new(
            Source::account("a1"),
            EventKind::Message(MessageContent::Unknown("file".into())),
        );
        assert_eq!(dispatcher().classify(&event), None);

        let event = CallbackEvent::new(Source::account("a1"), EventKind::Unknown("typing".into()));
        assert_eq!(dispatcher().classify(&event), None);
    }

    #[test]
    fn test_event_without_target_is_unhandled() {
        let event = CallbackEvent::new(Source::default(), EventKind::Join);
        assert_eq!(dispatcher().classify(&event), None);
    }

    #[test]
    fn test_unmatched_postback_has_no_content() {
        let event = CallbackEvent::new(Source::account("a1"), EventKind::Postback("next".into()));
        let payload = dispatcher().classify(&event).unwrap();
        assert!(!payload.has_content());
    }
}
