//! # WorksBot Transport
//!
//! The HTTP edges of the adapter.
//!
//! ## Features
//!
//! - `http-client` (default): server token issuance and message push
//! - `http-server` (default): callback ingress with signature verification
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────────────────────┐
//!  platform ─┤ server: callback_router  │── CallbackEvent ──▶ CallbackHandler
//!            └──────────────────────────┘
//!            ┌──────────────────────────┐
//!  platform ◀┤ client: WorksApiClient   │◀── ReplyPayload + token
//!            ├──────────────────────────┤
//!            │ token:  JwtTokenIssuer   │
//!            └──────────────────────────┘
//! ```
//!
//! | Seam | Trait | Implementation |
//! |------|-------|----------------|
//! | bearer tokens | [`TokenSource`] | [`JwtTokenIssuer`], [`StaticToken`] |
//! | message push | [`Deliver`] | [`WorksApiClient`] |
//! | inbound events | [`CallbackHandler`] | provided by the runtime |

pub mod error;
pub mod settings;

#[cfg(feature = "http-client")]
pub mod client;
#[cfg(feature = "http-client")]
pub mod token;

#[cfg(feature = "http-server")]
pub mod server;
#[cfg(feature = "http-server")]
pub mod signature;

pub use error::{
    DeliveryError, DeliveryResult, SignatureError, SignatureResult, TokenError, TokenResult,
    TransportError, TransportResult,
};
pub use settings::{ApiSettings, EndpointVersion, IngressSettings};

#[cfg(feature = "http-client")]
pub use client::{Deliver, WorksApiClient, build_http_client};
#[cfg(feature = "http-client")]
pub use token::{JwtTokenIssuer, StaticToken, TokenSource};

#[cfg(feature = "http-server")]
pub use server::{CallbackHandler, ListenerHandle, callback_router, serve};
