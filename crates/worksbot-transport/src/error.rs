//! Error types for the transport layer.

use thiserror::Error;

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors raised while setting up transports.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Binding or serving the listener failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// Invalid transport settings.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),

    /// Token issuer setup failed.
    #[error(transparent)]
    Token(#[from] TokenError),
}

// =============================================================================
// Token Errors
// =============================================================================

/// Errors raised while obtaining a server token.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    /// The private key is not a PKCS#8 RSA key in PEM or DER form.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// Signing the assertion failed.
    #[error("failed to sign assertion")]
    Signing,

    /// The token request did not complete.
    #[error("token request failed: {0}")]
    Request(String),

    /// The auth server answered with a non-success status.
    #[error("token endpoint returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response did not carry an access token.
    #[error("invalid token response: {0}")]
    Decode(String),
}

// =============================================================================
// Delivery Errors
// =============================================================================

/// Errors raised while pushing a reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The push request did not complete (connect, timeout, ...).
    #[error("push request failed: {0}")]
    Request(String),

    /// The platform answered with a non-success status.
    #[error("push endpoint returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
}

// =============================================================================
// Signature Errors
// =============================================================================

/// Reasons a callback request fails authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// No signature header.
    #[error("missing signature header")]
    Missing,

    /// The header is not valid base64.
    #[error("malformed signature header")]
    Malformed,

    /// The signature does not match the body.
    #[error("signature mismatch")]
    Mismatch,

    /// The secret was rejected as an HMAC key.
    #[error("invalid signing key")]
    InvalidKey,
}

/// Result type for transport setup.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for token issuance.
pub type TokenResult<T> = Result<T, TokenError>;

/// Result type for delivery.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Result type for signature checks.
pub type SignatureResult<T> = Result<T, SignatureError>;
