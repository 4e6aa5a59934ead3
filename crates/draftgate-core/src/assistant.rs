//! Event handlers tying the gate, the session and the collaborators
//! together.
//!
//! Each handler validates its input and the session state before making
//! any remote call, and changes the session only after the calls it
//! depends on have succeeded.

use std::sync::Arc;

use draftgate_gmail::{BodyFormat, DraftId, MailProvider, OutgoingMessage, render_html_body};
use draftgate_oauth2::{Authenticator, Credential, CredentialStore};
use draftgate_types::parse_address_list;
use tracing::{info, warn};

use crate::error::{AssistantError, Result};
use crate::gate::AccessGate;
use crate::generation::{EmailGenerator, GenerationMode, WorkflowRequest};
use crate::session::{PendingDraft, Principal, Session};

/// A draft created by [`Assistant::compose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftReceipt {
    pub draft_id: DraftId,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// What happened to the remote draft after a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftDeletion {
    Deleted,
    /// The draft is still in the mailbox.
    Failed(String),
}

/// Outcome of [`Assistant::send`]. The message itself was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub draft_id: DraftId,
    pub draft_deletion: DraftDeletion,
}

impl SendReport {
    pub fn draft_deleted(&self) -> bool {
        self.draft_deletion == DraftDeletion::Deleted
    }

    /// The non-fatal deletion failure, if any.
    pub fn deletion_error(&self) -> Option<AssistantError> {
        match &self.draft_deletion {
            DraftDeletion::Deleted => None,
            DraftDeletion::Failed(reason) => Some(AssistantError::DeleteFailed {
                draft_id: self.draft_id.to_string(),
                reason: reason.clone(),
            }),
        }
    }
}

/// Runs the authenticate / generate / approve / send workflow.
pub struct Assistant {
    authenticator: Arc<dyn Authenticator>,
    mail: Arc<dyn MailProvider>,
    generator: Arc<dyn EmailGenerator>,
    store: CredentialStore,
    gate: AccessGate,
}

impl Assistant {
    /// An assistant guarded by the built-in allow-list.
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        mail: Arc<dyn MailProvider>,
        generator: Arc<dyn EmailGenerator>,
        store: CredentialStore,
    ) -> Self {
        Self {
            authenticator,
            mail,
            generator,
            store,
            gate: AccessGate::builtin(),
        }
    }

    pub fn with_gate(mut self, gate: AccessGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Principals with a stored credential.
    pub fn stored_accounts(&self) -> Result<Vec<String>> {
        Ok(self.store.principals()?)
    }

    /// Run the OAuth handshake and sign in.
    ///
    /// The credential is written only after the principal passes the gate.
    pub async fn authenticate(&self, session: &mut Session) -> Result<Principal> {
        if let Some(current) = session.principal() {
            return Err(AssistantError::AlreadyAuthenticated(current.email().to_string()));
        }

        let credential = self
            .authenticator
            .authorize()
            .await
            .map_err(|e| AssistantError::AuthenticationFailed(e.to_string()))?;
        let email = self.identify(&credential).await?;

        if let Err(err) = self.gate.check(&email) {
            warn!(principal = %email, "authentication rejected by access gate");
            return Err(err);
        }

        let credential = credential.bind(email.clone());
        self.store.store(&credential)?;
        let principal = Principal::new(email);
        session.sign_in(&self.gate, principal.clone(), credential)?;
        info!(principal = %principal, "authenticated");
        Ok(principal)
    }

    /// Sign in from a stored credential, skipping the handshake.
    pub async fn resume(&self, session: &mut Session, email: &str) -> Result<Principal> {
        if let Some(current) = session.principal() {
            return Err(AssistantError::AlreadyAuthenticated(current.email().to_string()));
        }
        self.gate.check(email)?;

        let mut credential = self
            .store
            .load(email)?
            .ok_or_else(|| AssistantError::CredentialNotFound(email.to_string()))?;
        if credential.is_expired() {
            credential = self.refresh(&credential, email).await?;
        }

        let actual = self.identify(&credential).await?;
        if !actual.eq_ignore_ascii_case(email) {
            warn!(expected = %email, actual = %actual, "stored credential belongs to another principal");
            return Err(AssistantError::PrincipalMismatch {
                expected: email.to_string(),
                actual,
            });
        }

        let principal = Principal::new(actual.clone());
        session.sign_in(&self.gate, principal.clone(), credential.bind(actual))?;
        info!(principal = %principal, "resumed from stored credential");
        Ok(principal)
    }

    /// Leave the current account. The stored credential is kept.
    pub fn switch_account(&self, session: &mut Session) -> Result<Principal> {
        let principal = session.sign_out()?;
        info!(principal = %principal, "switched away from account");
        Ok(principal)
    }

    /// Leave the current account and delete its stored credential.
    pub fn logout(&self, session: &mut Session) -> Result<Principal> {
        let email = session
            .principal()
            .map(|p| p.email().to_string())
            .ok_or(AssistantError::NotAuthenticated)?;
        let removed = self.store.delete(&email)?;
        let principal = session.sign_out()?;
        info!(principal = %principal, removed, "logged out");
        Ok(principal)
    }

    /// Delete the stored credential for `email` without touching any
    /// session. Returns `false` if there was none.
    pub fn forget_account(&self, email: &str) -> Result<bool> {
        let removed = self.store.delete(email)?;
        info!(principal = %email, removed, "stored credential removed");
        Ok(removed)
    }

    /// Generate a plain-text body and leave it as a draft.
    ///
    /// Refused while another draft awaits approval.
    pub async fn compose(
        &self,
        session: &mut Session,
        description: &str,
        to: &str,
        subject: &str,
    ) -> Result<DraftReceipt> {
        let request = WorkflowRequest::new(description)?;
        let to = recipients(to)?;
        session.authenticated(&self.gate)?;
        if session.pending_draft().is_some() {
            return Err(AssistantError::ApprovalPending);
        }

        let generated = self.generator.generate(&request, GenerationMode::Text).await?;
        let credential = self.fresh_credential(session).await?;

        let message = OutgoingMessage {
            from: credential.principal.clone(),
            to,
            cc: Vec::new(),
            subject: subject.trim().to_string(),
            body: generated.body,
            format: BodyFormat::PlainText,
        };
        let draft_id = self
            .mail
            .create_draft(&credential, &message)
            .await
            .map_err(|e| AssistantError::DraftCreationFailed(e.to_string()))?;

        Ok(DraftReceipt {
            draft_id,
            to: message.to,
            subject: message.subject,
            body: message.body,
        })
    }

    /// Generate a subject and body, create one draft, and hold it for
    /// approval.
    pub async fn prepare_draft(
        &self,
        session: &mut Session,
        description: &str,
        to: &str,
        cc: &str,
    ) -> Result<PendingDraft> {
        let request = WorkflowRequest::new(description)?;
        let to = recipients(to)?;
        let cc = parse_address_list(cc);
        session.authenticated(&self.gate)?;
        if session.pending_draft().is_some() {
            return Err(AssistantError::ApprovalPending);
        }

        let generated = self
            .generator
            .generate(&request, GenerationMode::Structured)
            .await?;
        let credential = self.fresh_credential(session).await?;

        let subject = generated.subject.unwrap_or_default();
        let message = html_message(&credential, &to, &cc, &subject, &generated.body);
        let draft_id = self
            .mail
            .create_draft(&credential, &message)
            .await
            .map_err(|e| AssistantError::DraftCreationFailed(e.to_string()))?;

        let draft = PendingDraft {
            to,
            cc,
            subject,
            body: generated.body,
            draft_id,
        };
        session.begin_approval(draft.clone())?;
        info!(draft_id = %draft.draft_id, "draft awaiting approval");
        Ok(draft)
    }

    /// Discard the pending draft. The remote draft stays in the mailbox.
    pub fn cancel(&self, session: &mut Session) -> Result<PendingDraft> {
        let draft = session.take_pending()?;
        info!(draft_id = %draft.draft_id, "pending draft cancelled");
        Ok(draft)
    }

    /// Send the pending draft, then delete the remote draft.
    ///
    /// A failed send keeps the draft pending. Once the send succeeds the
    /// draft is cleared whatever happens to the deletion.
    pub async fn send(&self, session: &mut Session) -> Result<SendReport> {
        session.authenticated(&self.gate)?;
        let draft = session
            .pending_draft()
            .cloned()
            .ok_or(AssistantError::NoPendingDraft)?;
        let credential = self.fresh_credential(session).await?;

        let message = html_message(&credential, &draft.to, &draft.cc, &draft.subject, &draft.body);
        if let Err(e) = self.mail.send_message(&credential, &message).await {
            warn!(draft_id = %draft.draft_id, error = %e, "send failed; draft kept for approval");
            return Err(AssistantError::SendFailed(e.to_string()));
        }
        let draft = session.take_pending()?;

        let draft_deletion = match self.mail.delete_draft(&credential, &draft.draft_id).await {
            Ok(()) => DraftDeletion::Deleted,
            Err(e) => {
                warn!(draft_id = %draft.draft_id, error = %e, "message sent but draft not deleted");
                DraftDeletion::Failed(e.to_string())
            }
        };
        info!(draft_id = %draft.draft_id, recipients = draft.to.len(), "message sent");

        Ok(SendReport {
            to: draft.to,
            cc: draft.cc,
            subject: draft.subject,
            draft_id: draft.draft_id,
            draft_deletion,
        })
    }

    async fn identify(&self, credential: &Credential) -> Result<String> {
        self.mail
            .profile_email(credential)
            .await
            .map_err(|e| AssistantError::AuthenticationFailed(e.to_string()))
    }

    async fn refresh(&self, credential: &Credential, email: &str) -> Result<Credential> {
        let refreshed = self
            .authenticator
            .refresh(credential)
            .await
            .map_err(|e| AssistantError::AuthenticationFailed(e.to_string()))?
            .bind(email);
        self.store.store(&refreshed)?;
        Ok(refreshed)
    }

    /// The session credential, refreshed and persisted first if expired.
    async fn fresh_credential(&self, session: &mut Session) -> Result<Credential> {
        let (principal, credential) = session.authenticated(&self.gate)?;
        if !credential.is_expired() {
            return Ok(credential.clone());
        }
        let (email, stale) = (principal.email().to_string(), credential.clone());

        let refreshed = self.refresh(&stale, &email).await?;
        session.replace_credential(refreshed.clone())?;
        Ok(refreshed)
    }
}

fn recipients(to: &str) -> Result<Vec<String>> {
    let to = parse_address_list(to);
    if to.is_empty() {
        return Err(AssistantError::NoRecipients);
    }
    Ok(to)
}

fn html_message(
    credential: &Credential,
    to: &[String],
    cc: &[String],
    subject: &str,
    body: &str,
) -> OutgoingMessage {
    OutgoingMessage {
        from: credential.principal.clone(),
        to: to.to_vec(),
        cc: cc.to_vec(),
        subject: subject.to_string(),
        body: render_html_body(body),
        format: BodyFormat::Html,
    }
}
