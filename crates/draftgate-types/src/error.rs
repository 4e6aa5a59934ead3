//! Error types shared by the draftgate crates.
//!
//! [`DraftgateError`] covers failures that are not specific to one
//! collaborator: configuration, secrets, the filesystem, and JSON.

use thiserror::Error;

/// Framework-level error type.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DraftgateError {
    /// Configuration is malformed or semantically invalid.
    #[error("invalid config: {reason}")]
    ConfigInvalid {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// A secret referenced by name could not be resolved.
    #[error("secret not available: {0}")]
    SecretUnavailable(String),

    /// A value would escape its intended location (path traversal etc.).
    #[error("security violation: {reason}")]
    SecurityViolation {
        /// What policy was violated.
        reason: String,
    },

    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DraftgateError>;
