//! Runtime error types.

use thiserror::Error;
use worksbot_core::TemplateError;
use worksbot_transport::{TokenError, TransportError};

pub use crate::config::{ConfigError, ConfigResult};

/// Errors that can occur while building or running the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A catalog entry breaks its template's limits.
    #[error("Template catalog error: {0}")]
    Template(#[from] TemplateError),

    /// HTTP client setup or listener failure.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// No bearer token could be obtained for a reply.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
