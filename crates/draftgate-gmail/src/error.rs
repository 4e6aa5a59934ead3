//! Mail provider error types.

use thiserror::Error;

/// Errors from the messaging provider.
#[derive(Error, Debug)]
pub enum MailError {
    /// The access token was rejected (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The API answered with a non-success status.
    #[error("api error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider-supplied message.
        message: String,
    },

    /// The API answered success but the body was not what we expected.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The message could not be built (e.g. no recipients).
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// HTTP-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result alias for mail operations.
pub type Result<T> = std::result::Result<T, MailError>;
