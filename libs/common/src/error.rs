//! Custom error types for calls against the managed backend
//!
//! All crates in the workspace report failures against the managed backend
//! through this taxonomy, so callers can distinguish credential problems
//! from transport or decoding failures.

use thiserror::Error;

/// Custom error type for backend operations
#[derive(Error, Debug)]
pub enum BackendError {
    /// The HTTP request itself failed (connect, timeout, TLS)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend rejected the supplied email/password pair
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The backend answered with a non-success status
    #[error("backend error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The requested record does not exist
    #[error("record not found")]
    NotFound,

    /// A response body could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A session token could not be inspected
    #[error("invalid session token: {0}")]
    Token(String),

    /// Reading or writing the persisted session failed
    #[error("session storage error: {0}")]
    Storage(#[source] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with BackendError
pub type BackendResult<T> = Result<T, BackendError>;
