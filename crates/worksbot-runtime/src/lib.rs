//! # WorksBot Runtime
//!
//! Ties the pure dispatcher to the HTTP transports and owns the ambient
//! concerns: configuration loading, validation and logging.
//!
//! ```text
//!  ConfigLoader ──▶ WorksBotConfig ──validate_config──▶ WorksBotRuntime
//!                                                        ├── Dispatcher       (worksbot-core)
//!                                                        ├── JwtTokenIssuer   (worksbot-transport)
//!                                                        ├── WorksApiClient   (worksbot-transport)
//!                                                        └── callback_router  (worksbot-transport)
//! ```
//!
//! # Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: `logging.format = "json"`
//!
//! ```rust,ignore
//! use worksbot_runtime::WorksBotRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     WorksBotRuntime::builder().build()?.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader, ConfigResult, WorksBotConfig, validate_config};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{Outcome, RuntimeBuilder, WorksBotRuntime};

pub use tracing;
