//! OAuth2 authorization and credential storage for draftgate.
//!
//! Provides the installed-application authorization code flow over a
//! loopback redirect, token refresh, and one credential file per
//! principal.
//!
//! # Security
//!
//! - OAuth2 `state` parameter for CSRF protection (mandatory).
//! - PKCE (S256) on every authorization.
//! - Credential files written atomically with 0600 permissions in a
//!   0700 directory.
//! - The client secret is read from an environment variable at call
//!   time, never from the config file.
//! - The credential store never decides who may act: it persists only
//!   what the caller hands it, after the access gate has passed.

pub mod credential;
pub mod error;
pub mod flow;
pub mod pkce;
pub mod store;

pub use credential::Credential;
pub use error::{OAuthError, Result};
pub use flow::{Authenticator, LoopbackAuthenticator, PendingAuthorization, TokenClient};
pub use store::CredentialStore;
