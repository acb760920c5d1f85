//! Error taxonomy for the BookBond client.
//!
//! Three failure families matter to callers: the request never completed
//! ([`ApiError::Network`]), the server answered with a non-success status
//! ([`ApiError::Server`] and its more specific refinements), or the input
//! was rejected locally before any request was sent
//! ([`ApiError::Validation`]). No variant is ever retried automatically; a
//! failed mutation requires explicit user re-action.

use thiserror::Error;

/// Errors that can occur when talking to the BookBond API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (DNS, connect, timeout, ...).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the API's error envelope, when present.
        message: String,
    },

    /// The session token was missing, invalid, or expired (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The input was rejected locally; no request was dispatched.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The response body could not be decoded.
    #[error("response parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether this failure indicates a missing or expired session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Whether this failure happened before any request was sent.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
