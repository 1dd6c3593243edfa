//! # WorksBot
//!
//! A webhook bot for LINE WORKS. Each callback the platform posts is
//! classified into at most one reply, which is pushed back through the
//! messaging API.
//!
//! ## Architecture
//!
//! ```text
//!  platform ──POST /callback──▶ worksbot-transport::server
//!                                        │ CallbackEvent
//!                                        ▼
//!                               worksbot-core::Dispatcher
//!                                        │ ReplyPayload
//!                                        ▼
//!  platform ◀──message push──── worksbot-transport::client (+ token)
//!
//!  worksbot-runtime wires the three together and owns config and logging.
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use worksbot::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = WorksBotRuntime::builder().profile("production").build()?;
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log lines

pub use worksbot_core as core;
pub use worksbot_runtime as runtime;
pub use worksbot_transport as transport;

/// Commonly used types.
pub mod prelude {
    pub use worksbot_core::{
        CallbackEvent, DispatchFeatures, Dispatcher, EventKind, ReplyContent, ReplyPayload,
        ReplyTarget, Replies, Source, TemplateCatalog, TemplateKind,
    };
    pub use worksbot_runtime::{
        ConfigLoader, Outcome, RuntimeError, RuntimeResult, WorksBotConfig, WorksBotRuntime,
    };
    pub use worksbot_transport::{Deliver, StaticToken, TokenSource};
}
