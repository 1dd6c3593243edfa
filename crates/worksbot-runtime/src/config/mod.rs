//! Configuration for the WorksBot runtime.
//!
//! One [`WorksBotConfig`] is loaded at startup and handed, piece by piece,
//! to the transports and the dispatcher. Nothing reads the environment
//! after loading.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    DispatchConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, ServerConfig, SpanEventConfig,
    WorksBotConfig, WorksConfig,
};
pub use validation::validate_config;
