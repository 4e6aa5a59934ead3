//! # draftgate-types
//!
//! Shared type definitions for draftgate, a domain-restricted email
//! drafting assistant.
//!
//! Every other draftgate crate depends on this one. It contains:
//!
//! - **[`error`]** -- [`DraftgateError`] for configuration and I/O failures
//! - **[`config`]** -- Configuration schema (OAuth client, LLM, storage, Gmail)
//! - **[`loader`]** -- Config file discovery and loading
//! - **[`secret`]** -- [`SecretString`] and env-backed [`SecretRef`]
//! - **[`address`]** -- Comma-separated address list parsing

pub mod address;
pub mod config;
pub mod error;
pub mod loader;
pub mod secret;

pub use address::{join_addresses, parse_address_list};
pub use config::Config;
pub use error::{DraftgateError, Result};
pub use secret::{SecretRef, SecretString};
