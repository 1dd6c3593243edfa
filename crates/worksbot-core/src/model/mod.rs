//! Wire model for callbacks and replies.
//!
//! - [`event`]: inbound callback events and their parser
//! - [`action`]: interactive actions
//! - [`content`]: reply content, templates and their structural rules
//! - [`payload`]: reply targets and the push envelope

pub mod action;
pub mod content;
pub mod event;
pub mod payload;

pub use action::{Action, ActionKind};
pub use content::{
    ButtonTemplate, Carousel, CarouselColumn, CoverData, ImageCarousel, ImageColumn,
    ListElement, ListTemplate, QuickReply, QuickReplyItem, ReplyContent, TemplateKind, TextReply,
};
pub use event::{
    CallbackEvent, EventKind, ImageContent, LocationContent, MessageContent, Source,
    StickerContent, TextContent, parse_callback_event,
};
pub use payload::{PushEnvelope, ReplyPayload, ReplyTarget};
