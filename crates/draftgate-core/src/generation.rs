//! Email generation: one language-model call per request.

use std::sync::Arc;

use async_trait::async_trait;
use draftgate_llm::{ChatMessage, ChatRequest, Provider};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{AssistantError, Result};

const STRUCTURED_SYSTEM_PROMPT: &str = "\
You are an expert professional email writer.

Write the email described by the user.

Rules:
- Plain text only
- Proper paragraphs
- Professional tone
- No subject inside body
- End with sign-off

Return a JSON object with a \"subject\" and a \"body\" field.";

/// A description of the email to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRequest {
    description: String,
}

impl WorkflowRequest {
    /// Validate and trim the description. Blank input is refused.
    pub fn new(description: impl AsRef<str>) -> Result<Self> {
        let description = description.as_ref().trim();
        if description.is_empty() {
            return Err(AssistantError::EmptyDescription);
        }
        Ok(Self {
            description: description.to_string(),
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// The model's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedEmail {
    /// Present in structured mode only.
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// A single text blob used as the body.
    Text,
    /// A `{subject, body}` pair.
    Structured,
}

/// Produces email content from a description.
#[async_trait]
pub trait EmailGenerator: Send + Sync {
    async fn generate(&self, request: &WorkflowRequest, mode: GenerationMode)
    -> Result<GeneratedEmail>;
}

/// [`EmailGenerator`] over a chat-completion [`Provider`].
pub struct LlmEmailGenerator {
    provider: Arc<dyn Provider>,
    model: Option<String>,
}

#[derive(Deserialize)]
struct StructuredEmail {
    subject: String,
    body: String,
}

impl LlmEmailGenerator {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            model: None,
        }
    }

    /// Use `model` instead of the provider default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    fn build_request(&self, request: &WorkflowRequest, mode: GenerationMode) -> ChatRequest {
        match mode {
            GenerationMode::Text => ChatRequest::new(
                self.model(),
                vec![ChatMessage::user(request.description())],
            ),
            GenerationMode::Structured => ChatRequest::new(
                self.model(),
                vec![
                    ChatMessage::system(STRUCTURED_SYSTEM_PROMPT),
                    ChatMessage::user(request.description()),
                ],
            )
            .with_json_schema("structured_email", structured_schema()),
        }
    }
}

#[async_trait]
impl EmailGenerator for LlmEmailGenerator {
    async fn generate(
        &self,
        request: &WorkflowRequest,
        mode: GenerationMode,
    ) -> Result<GeneratedEmail> {
        let chat = self.build_request(request, mode);
        debug!(provider = %self.provider.name(), model = %chat.model, ?mode, "generating email");

        let response = self
            .provider
            .complete(&chat)
            .await
            .map_err(|e| AssistantError::GenerationFailed(e.to_string()))?;
        let content = response
            .first_content()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AssistantError::GenerationFailed("model returned no content".into()))?;

        let email = match mode {
            GenerationMode::Text => GeneratedEmail {
                subject: None,
                body: content.to_string(),
            },
            GenerationMode::Structured => parse_structured(content)?,
        };
        info!(
            model = %response.model,
            body_len = email.body.len(),
            "email generated"
        );
        Ok(email)
    }
}

fn structured_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "subject": { "type": "string", "description": "Email subject" },
            "body": { "type": "string", "description": "Email body" }
        },
        "required": ["subject", "body"],
        "additionalProperties": false
    })
}

/// Parse `{subject, body}`, tolerating a Markdown code fence around it.
fn parse_structured(content: &str) -> Result<GeneratedEmail> {
    let json = strip_code_fence(content);
    let parsed: StructuredEmail = serde_json::from_str(json).map_err(|e| {
        AssistantError::GenerationFailed(format!("unparseable structured output: {e}"))
    })?;

    let subject = parsed.subject.trim();
    let body = parsed.body.trim();
    if subject.is_empty() || body.is_empty() {
        return Err(AssistantError::GenerationFailed(
            "structured output has an empty subject or body".into(),
        ));
    }
    Ok(GeneratedEmail {
        subject: Some(subject.to_string()),
        body: body.to_string(),
    })
}

fn strip_code_fence(content: &str) -> &str {
    let Some(inner) = content.strip_prefix("```") else {
        return content;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
