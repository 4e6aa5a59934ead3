//! The messaging-provider collaborator interface.

use async_trait::async_trait;
use draftgate_oauth2::Credential;

use crate::error::Result;
use crate::message::{DraftId, OutgoingMessage};

/// Remote mailbox operations on behalf of one principal.
///
/// Each method is one request; nothing is retried.
#[async_trait]
pub trait MailProvider: Send + Sync {
    /// The email address the credential belongs to, as the provider
    /// reports it.
    async fn profile_email(&self, credential: &Credential) -> Result<String>;

    /// Create a draft and return its identifier.
    async fn create_draft(&self, credential: &Credential, message: &OutgoingMessage)
    -> Result<DraftId>;

    /// Send a message.
    async fn send_message(&self, credential: &Credential, message: &OutgoingMessage) -> Result<()>;

    /// Delete a draft.
    async fn delete_draft(&self, credential: &Credential, draft: &DraftId) -> Result<()>;
}
