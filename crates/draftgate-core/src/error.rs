//! Error taxonomy for workflow actions.
//!
//! Every variant is recoverable: the caller reports it and the session
//! stays usable. Only a failed authentication leaves the session
//! anonymous.

use draftgate_types::DraftgateError;
use thiserror::Error;

/// Errors surfaced by [`Assistant`](crate::Assistant) handlers.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// The principal's domain is not on the allow-list.
    #[error("access denied: {email} is not in an allowed domain")]
    AuthorizationDenied { email: String },

    /// The OAuth handshake or the identity lookup failed.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The stored credential belongs to someone else.
    #[error("credential for {expected} authenticates as {actual}")]
    PrincipalMismatch { expected: String, actual: String },

    /// No stored credential for the requested principal.
    #[error("no stored credential for {0}; run login first")]
    CredentialNotFound(String),

    /// Reading or writing the credential file failed.
    #[error("credential store: {0}")]
    CredentialStore(#[from] DraftgateError),

    /// The language model call failed.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// The provider refused to create the draft.
    #[error("draft creation failed: {0}")]
    DraftCreationFailed(String),

    /// The message was not sent.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The message was sent but the stale draft could not be removed.
    #[error("message sent, but deleting draft {draft_id} failed: {reason}")]
    DeleteFailed { draft_id: String, reason: String },

    /// The description was empty.
    #[error("please enter a description of the email")]
    EmptyDescription,

    /// No usable recipient addresses were given.
    #[error("at least one recipient is required")]
    NoRecipients,

    /// The action needs an authenticated session.
    #[error("not signed in")]
    NotAuthenticated,

    /// Already signed in; switch account or log out first.
    #[error("already signed in as {0}")]
    AlreadyAuthenticated(String),

    /// A draft is waiting for send or cancel.
    #[error("a draft is awaiting approval; send or cancel it first")]
    ApprovalPending,

    /// Send or cancel without a draft awaiting approval.
    #[error("no draft is awaiting approval")]
    NoPendingDraft,
}

/// Result alias for workflow actions.
pub type Result<T> = std::result::Result<T, AssistantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_denied_names_the_email() {
        let err = AssistantError::AuthorizationDenied {
            email: "eve@gmail.com".into(),
        };
        assert_eq!(
            err.to_string(),
            "access denied: eve@gmail.com is not in an allowed domain"
        );
    }

    #[test]
    fn delete_failed_says_the_message_went_out() {
        let err = AssistantError::DeleteFailed {
            draft_id: "r-1".into(),
            reason: "404".into(),
        };
        assert!(err.to_string().starts_with("message sent"));
    }

    #[test]
    fn store_errors_convert() {
        let err: AssistantError = DraftgateError::SecurityViolation {
            reason: "path separator".into(),
        }
        .into();
        assert!(matches!(err, AssistantError::CredentialStore(_)));
    }
}
