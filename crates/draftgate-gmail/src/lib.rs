//! Gmail integration for draftgate.
//!
//! Provides the [`MailProvider`] trait (profile lookup, draft creation,
//! sending, draft deletion) and its Gmail REST implementation,
//! [`GmailClient`]. Messages are built as single-part MIME documents and
//! submitted base64url encoded in the `raw` field.
//!
//! # Authentication
//!
//! Every call takes the principal's [`Credential`](draftgate_oauth2::Credential)
//! from the OAuth2 crate; the access token is sent as a bearer token.

pub mod client;
pub mod error;
pub mod message;
pub mod provider;

pub use client::{DEFAULT_BASE_URL, GmailClient};
pub use error::{MailError, Result};
pub use message::{BodyFormat, DraftId, OutgoingMessage, render_html_body};
pub use provider::MailProvider;
