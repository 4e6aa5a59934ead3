//! Authorization and workflow policy for draftgate.
//!
//! - [`AccessGate`] decides who may act, from the email domain alone
//! - [`Session`] is the explicit per-operator state machine
//!   (anonymous, authenticated, pending approval)
//! - [`EmailGenerator`] turns a description into email content
//! - [`Assistant`] runs each workflow event against a session and the
//!   remote collaborators

pub mod assistant;
pub mod error;
pub mod gate;
pub mod generation;
pub mod session;

pub use assistant::{Assistant, DraftDeletion, DraftReceipt, SendReport};
pub use error::{AssistantError, Result};
pub use gate::{ALLOWED_DOMAINS, AccessGate};
pub use generation::{
    EmailGenerator, GeneratedEmail, GenerationMode, LlmEmailGenerator, WorkflowRequest,
};
pub use session::{PendingDraft, Principal, Session, SessionState};
