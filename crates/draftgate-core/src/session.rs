//! Per-operator session state machine.
//!
//! A [`Session`] is owned by whoever drives the workflow (one CLI command
//! or an interactive shell) and passed by `&mut` to each handler. It moves
//! between three states:
//!
//! ```text
//! Anonymous --sign_in--> Authenticated --begin_approval--> PendingApproval
//!     ^                       |   ^                              |
//!     +------sign_out---------+   +---------take_pending---------+
//! ```
//!
//! `sign_out` is also accepted from `PendingApproval`. Transition methods
//! check their preconditions first and leave the state untouched when
//! they fail.

use draftgate_gmail::DraftId;
use draftgate_oauth2::Credential;
use tracing::{debug, warn};

use crate::error::{AssistantError, Result};
use crate::gate::AccessGate;

/// An authenticated user, identified by email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    email: String,
}

impl Principal {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Domain part of the email address (empty when malformed).
    pub fn domain(&self) -> &str {
        AccessGate::domain_of(&self.email).unwrap_or_default()
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.email)
    }
}

/// Generated content with a remote draft, waiting for send or cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDraft {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub draft_id: DraftId,
}

#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated {
        principal: Principal,
        credential: Credential,
    },
    PendingApproval {
        principal: Principal,
        credential: Credential,
        draft: PendingDraft,
    },
}

/// Explicit session context.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_name(&self) -> &'static str {
        match self.state {
            SessionState::Anonymous => "anonymous",
            SessionState::Authenticated { .. } => "authenticated",
            SessionState::PendingApproval { .. } => "pending-approval",
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        match &self.state {
            SessionState::Anonymous => None,
            SessionState::Authenticated { principal, .. }
            | SessionState::PendingApproval { principal, .. } => Some(principal),
        }
    }

    pub fn pending_draft(&self) -> Option<&PendingDraft> {
        match &self.state {
            SessionState::PendingApproval { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self.state, SessionState::Anonymous)
    }

    pub fn is_authenticated(&self) -> bool {
        !self.is_anonymous()
    }

    /// Enter `Authenticated`. The gate is checked before anything changes.
    pub fn sign_in(
        &mut self,
        gate: &AccessGate,
        principal: Principal,
        credential: Credential,
    ) -> Result<()> {
        if let Some(current) = self.principal() {
            return Err(AssistantError::AlreadyAuthenticated(current.email().to_string()));
        }
        gate.check(principal.email())?;
        debug!(principal = %principal, "session authenticated");
        self.state = SessionState::Authenticated {
            principal,
            credential,
        };
        Ok(())
    }

    /// Return to `Anonymous`, discarding any pending draft.
    pub fn sign_out(&mut self) -> Result<Principal> {
        match std::mem::take(&mut self.state) {
            SessionState::Anonymous => Err(AssistantError::NotAuthenticated),
            SessionState::Authenticated { principal, .. } => Ok(principal),
            SessionState::PendingApproval {
                principal, draft, ..
            } => {
                warn!(draft_id = %draft.draft_id, "pending draft discarded on sign-out");
                Ok(principal)
            }
        }
    }

    /// Principal and credential of an authenticated session, after
    /// re-checking the gate.
    ///
    /// A session whose principal no longer passes the gate is reset to
    /// `Anonymous`.
    pub fn authenticated(&mut self, gate: &AccessGate) -> Result<(&Principal, &Credential)> {
        let email = self
            .principal()
            .map(|p| p.email().to_string())
            .ok_or(AssistantError::NotAuthenticated)?;
        if let Err(err) = gate.check(&email) {
            warn!(principal = %email, "session principal failed the access gate; resetting");
            self.state = SessionState::Anonymous;
            return Err(err);
        }
        match &self.state {
            SessionState::Authenticated {
                principal,
                credential,
            }
            | SessionState::PendingApproval {
                principal,
                credential,
                ..
            } => Ok((principal, credential)),
            SessionState::Anonymous => Err(AssistantError::NotAuthenticated),
        }
    }

    /// Move from `Authenticated` to `PendingApproval`.
    pub fn begin_approval(&mut self, draft: PendingDraft) -> Result<()> {
        match std::mem::take(&mut self.state) {
            SessionState::Authenticated {
                principal,
                credential,
            } => {
                self.state = SessionState::PendingApproval {
                    principal,
                    credential,
                    draft,
                };
                Ok(())
            }
            other => {
                let err = match other {
                    SessionState::Anonymous => AssistantError::NotAuthenticated,
                    _ => AssistantError::ApprovalPending,
                };
                self.state = other;
                Err(err)
            }
        }
    }

    /// Move from `PendingApproval` back to `Authenticated`, handing out
    /// the draft.
    pub fn take_pending(&mut self) -> Result<PendingDraft> {
        match std::mem::take(&mut self.state) {
            SessionState::PendingApproval {
                principal,
                credential,
                draft,
            } => {
                self.state = SessionState::Authenticated {
                    principal,
                    credential,
                };
                Ok(draft)
            }
            other => {
                let err = match other {
                    SessionState::Anonymous => AssistantError::NotAuthenticated,
                    _ => AssistantError::NoPendingDraft,
                };
                self.state = other;
                Err(err)
            }
        }
    }

    /// Swap in a refreshed credential for the current principal.
    pub fn replace_credential(&mut self, fresh: Credential) -> Result<()> {
        match &mut self.state {
            SessionState::Anonymous => Err(AssistantError::NotAuthenticated),
            SessionState::Authenticated { credential, .. }
            | SessionState::PendingApproval { credential, .. } => {
                *credential = fresh;
                Ok(())
            }
        }
    }
}
