//! Gmail REST client.

use async_trait::async_trait;
use draftgate_oauth2::Credential;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{MailError, Result};
use crate::message::{DraftId, OutgoingMessage};
use crate::provider::MailProvider;

/// Default API root for the authenticated user's mailbox.
pub const DEFAULT_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// [`MailProvider`] backed by the Gmail v1 REST API.
#[derive(Debug, Clone)]
pub struct GmailClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    email_address: Option<String>,
}

#[derive(Deserialize)]
struct DraftResponse {
    id: Option<String>,
}

impl GmailClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        credential: &Credential,
    ) -> Result<reqwest::Response> {
        let response = request.bearer_auth(&credential.access_token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        debug!(status = code, %message, "gmail request failed");
        if code == 401 {
            Err(MailError::Unauthorized(message))
        } else {
            Err(MailError::Api {
                status: code,
                message,
            })
        }
    }
}

impl Default for GmailClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl MailProvider for GmailClient {
    async fn profile_email(&self, credential: &Credential) -> Result<String> {
        let request = self.http.get(self.url("profile"));
        let response = self.execute(request, credential).await?;
        let profile: ProfileResponse = response
            .json()
            .await
            .map_err(|e| MailError::InvalidResponse(format!("profile: {e}")))?;
        profile
            .email_address
            .filter(|e| !e.is_empty())
            .ok_or_else(|| MailError::InvalidResponse("profile has no emailAddress".into()))
    }

    async fn create_draft(
        &self,
        credential: &Credential,
        message: &OutgoingMessage,
    ) -> Result<DraftId> {
        let raw = message.to_raw()?;
        let request = self
            .http
            .post(self.url("drafts"))
            .json(&json!({ "message": { "raw": raw } }));
        let response = self.execute(request, credential).await?;
        let draft: DraftResponse = response
            .json()
            .await
            .map_err(|e| MailError::InvalidResponse(format!("draft: {e}")))?;
        let id = draft
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MailError::InvalidResponse("draft has no id".into()))?;

        info!(draft_id = %id, recipients = message.to.len(), "draft created");
        Ok(DraftId(id))
    }

    async fn send_message(&self, credential: &Credential, message: &OutgoingMessage) -> Result<()> {
        let raw = message.to_raw()?;
        let request = self
            .http
            .post(self.url("messages/send"))
            .json(&json!({ "raw": raw }));
        self.execute(request, credential).await?;
        info!(recipients = message.to.len(), "message sent");
        Ok(())
    }

    async fn delete_draft(&self, credential: &Credential, draft: &DraftId) -> Result<()> {
        let request = self.http.delete(self.url(&format!("drafts/{}", draft.as_str())));
        self.execute(request, credential).await?;
        debug!(draft_id = %draft, "draft deleted");
        Ok(())
    }
}

/// Pull `error.message` out of a Google API error body, falling back to
/// the raw text.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = GmailClient::new("http://localhost:9000/users/me/");
        assert_eq!(client.url("drafts"), "http://localhost:9000/users/me/drafts");
    }

    #[test]
    fn default_points_at_gmail() {
        assert_eq!(GmailClient::default().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn error_message_from_google_body() {
        let body = r#"{"error":{"code":403,"message":"Insufficient Permission","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(extract_error_message(body), "Insufficient Permission");
    }

    #[test]
    fn error_message_falls_back_to_text() {
        assert_eq!(extract_error_message("Bad Gateway"), "Bad Gateway");
    }
}
