//! Error types for the core crate.
//!
//! The core is pure: the only failures it can report are malformed inbound
//! events and reply content that breaks a template's structural limits.

use thiserror::Error;

use crate::model::{ActionKind, TemplateKind};

// =============================================================================
// Event Errors
// =============================================================================

/// Errors raised while decoding an inbound callback event.
#[derive(Debug, Error)]
pub enum EventError {
    /// The body is not valid JSON, or a known event is missing fields.
    #[error("failed to decode callback event: {0}")]
    Decode(#[from] serde_json::Error),

    /// The event has no `source` object.
    #[error("callback event has no source")]
    MissingSource,

    /// The `source` object carries neither a room id nor an account id.
    #[error("callback source has neither roomId nor accountId")]
    EmptySource,

    /// The event has no string `type` discriminator.
    #[error("callback event has no type")]
    MissingType,
}

// =============================================================================
// Template Errors
// =============================================================================

/// Structural violations of the platform's template rules.
///
/// These indicate a programming error in whoever assembled the content;
/// they are never recovered from at request time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// An action kind that the template does not accept.
    #[error("{template} does not accept '{action}' actions")]
    ActionNotAllowed {
        /// The template being validated.
        template: TemplateKind,
        /// The offending action kind.
        action: ActionKind,
    },

    /// Too many elements, columns or items.
    #[error("{template} allows at most {max} {what}, got {actual}")]
    TooMany {
        /// The template being validated.
        template: TemplateKind,
        /// What was counted ("elements", "columns", "action rows", ...).
        what: &'static str,
        /// The platform limit.
        max: usize,
        /// The number supplied.
        actual: usize,
    },

    /// A template that needs at least one entry was given none.
    #[error("{template} needs at least one {what}")]
    Empty {
        /// The template being validated.
        template: TemplateKind,
        /// What was missing.
        what: &'static str,
    },
}

impl TemplateError {
    /// Creates a [`TemplateError::TooMany`].
    pub fn too_many(template: TemplateKind, what: &'static str, max: usize, actual: usize) -> Self {
        Self::TooMany {
            template,
            what,
            max,
            actual,
        }
    }
}

/// Result type for event decoding.
pub type EventResult<T> = Result<T, EventError>;

/// Result type for template validation.
pub type TemplateResult<T> = Result<T, TemplateError>;
