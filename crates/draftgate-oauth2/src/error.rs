//! OAuth2 error types.

use draftgate_types::DraftgateError;
use thiserror::Error;

/// Errors from the authorization flow, token endpoint, or credential store.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// Client configuration is incomplete (client ID, secret, endpoints).
    #[error("oauth not configured: {0}")]
    NotConfigured(String),

    /// The callback `state` did not match the one we issued.
    #[error("state parameter mismatch (possible CSRF attack)")]
    StateMismatch,

    /// The user or the provider refused the authorization.
    #[error("authorization denied: {0}")]
    Denied(String),

    /// No callback arrived within the authorization-state lifetime.
    #[error("authorization expired before the callback arrived")]
    Expired,

    /// The token endpoint rejected the request or answered nonsense.
    #[error("token request failed: {0}")]
    TokenRequest(String),

    /// A refresh was needed but the credential has no refresh token.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// Credential file handling failed.
    #[error("credential store: {0}")]
    Store(#[from] DraftgateError),

    /// I/O on the loopback listener.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP-level failure talking to the token endpoint.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result alias for OAuth2 operations.
pub type Result<T> = std::result::Result<T, OAuthError>;
