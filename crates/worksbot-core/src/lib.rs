//! # WorksBot Core
//!
//! The pure part of the WorksBot adapter: it turns a decoded callback event
//! into the reply that should be pushed back, without doing any I/O.
//!
//! ## Flow
//!
//! ```text
//! raw body ──parse_callback_event──▶ CallbackEvent
//!                                        │
//!                                        ▼
//!                                   Dispatcher::classify ──▶ match_kind ──▶ TemplateCatalog
//!                                        │
//!                                        ▼
//!                         Option<ReplyPayload { target, content? }>
//!                                        │ into_envelope(bot_no)
//!                                        ▼
//!                                   PushEnvelope  (handed to the transport)
//! ```
//!
//! ## Modules
//!
//! - [`model`]: events, actions, reply content and payloads
//! - [`matcher`]: token → [`TemplateKind`] selection
//! - [`catalog`]: the demo template catalog
//! - [`dispatcher`]: the event → payload decision
//! - [`replies`]: configurable fixed texts
//!
//! ## Example
//!
//! ```rust
//! use worksbot_core::{DispatchFeatures, Dispatcher, Replies, parse_callback_event};
//!
//! let dispatcher = Dispatcher::new(
//!     DispatchFeatures::default(),
//!     Replies::default(),
//!     "https://img.example.com",
//! );
//! let event = parse_callback_event(
//!     br#"{"type":"message","source":{"accountId":"a1"},"content":{"type":"text","text":"c"}}"#,
//! )
//! .unwrap();
//!
//! let payload = dispatcher.classify(&event).unwrap();
//! assert_eq!(payload.content.unwrap().content_type(), "carousel");
//! ```

pub mod catalog;
pub mod dispatcher;
pub mod error;
pub mod matcher;
pub mod model;
pub mod replies;

pub use catalog::TemplateCatalog;
pub use dispatcher::{DispatchFeatures, Dispatcher, START_POSTBACK};
pub use error::{EventError, EventResult, TemplateError, TemplateResult};
pub use matcher::match_kind;
pub use model::{
    Action, ActionKind, CallbackEvent, EventKind, MessageContent, PushEnvelope, ReplyContent,
    ReplyPayload, ReplyTarget, Source, TemplateKind, parse_callback_event,
};
pub use replies::Replies;
