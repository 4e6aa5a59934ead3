//! OpenAI-compatible provider implementation.
//!
//! [`OpenAiCompatProvider`] talks to any API that accepts the OpenAI chat
//! completion request format (OpenAI, Groq, OpenRouter, local servers).

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::LlmProviderConfig;
use crate::error::{ProviderError, Result};
use crate::provider::Provider;
use crate::types::{ChatRequest, ChatResponse};

/// An LLM provider using the OpenAI-compatible chat completion API.
pub struct OpenAiCompatProvider {
    config: LlmProviderConfig,
    http: reqwest::Client,
    api_key: Option<String>,
}

impl OpenAiCompatProvider {
    /// Create a provider that reads its API key from `config.api_key_env`
    /// at request time.
    pub fn new(config: LlmProviderConfig) -> Self {
        Self {
            http: build_client(&config),
            config,
            api_key: None,
        }
    }

    /// Create a provider with an explicit API key.
    pub fn with_api_key(config: LlmProviderConfig, api_key: String) -> Self {
        Self {
            http: build_client(&config),
            config,
            api_key: Some(api_key),
        }
    }

    /// Returns the provider configuration.
    pub fn config(&self) -> &LlmProviderConfig {
        &self.config
    }

    fn completions_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    /// Explicit key first, then the environment variable.
    fn resolve_api_key(&self) -> Result<String> {
        if let Some(ref key) = self.api_key {
            return Ok(key.clone());
        }
        match std::env::var(&self.config.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(ProviderError::NotConfigured(format!(
                "set {} env var",
                self.config.api_key_env
            ))),
        }
    }
}

fn build_client(config: &LlmProviderConfig) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "falling back to default HTTP client");
        reqwest::Client::new()
    })
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let api_key = self.resolve_api_key()?;
        let url = self.completions_url();

        debug!(
            provider = %self.config.name,
            model = %request.model,
            messages = request.messages.len(),
            structured = request.response_format.is_some(),
            "sending chat completion request"
        );

        let mut req = self.http.post(&url).bearer_auth(&api_key);
        for (k, v) in &self.config.headers {
            req = req.header(k.as_str(), v.as_str());
        }

        let response = req.json(request).send().await.map_err(map_send_error)?;
        let status = response.status();

        if !status.is_success() {
            let retry_header = parse_retry_after_header(&response);
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body).unwrap_or(body);

            return Err(match status.as_u16() {
                401 | 403 => ProviderError::AuthFailed(message),
                404 => ProviderError::ModelNotFound(format!("model '{}': {message}", request.model)),
                429 => {
                    let retry_after_ms = retry_header.unwrap_or(1000);
                    warn!(
                        provider = %self.config.name,
                        retry_after_ms,
                        "rate limited"
                    );
                    ProviderError::RateLimited { retry_after_ms }
                }
                _ => ProviderError::RequestFailed(format!("HTTP {status}: {message}")),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("failed to parse response: {e}"))
        })?;

        debug!(
            provider = %self.config.name,
            model = %chat_response.model,
            choices = chat_response.choices.len(),
            "chat completion response received"
        );

        Ok(chat_response)
    }
}

fn map_send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Http(e)
    }
}

/// Pull `error.message` (OpenAI) or a string `error` out of a JSON body.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .map(String::from)
}

/// Numeric `Retry-After` header, in milliseconds.
fn parse_retry_after_header(response: &reqwest::Response) -> Option<u64> {
    let secs = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())?
        .parse::<f64>()
        .ok()?;
    Some((secs * 1000.0).max(0.0) as u64)
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("name", &self.config.name)
            .field("base_url", &self.config.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> LlmProviderConfig {
        let mut config = LlmProviderConfig::openai("test-model");
        config.name = "test-provider".into();
        config.base_url = "https://api.example.com/v1".into();
        config.api_key_env = "DRAFTGATE_TEST_LLM_KEY".into();
        config
    }

    #[test]
    fn completions_url_strips_trailing_slash() {
        let mut config = test_config();
        config.base_url = "https://api.example.com/v1/".into();
        let provider = OpenAiCompatProvider::new(config);
        assert_eq!(
            provider.completions_url(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn explicit_key_wins() {
        let provider = OpenAiCompatProvider::with_api_key(test_config(), "sk-explicit".into());
        assert_eq!(provider.resolve_api_key().unwrap(), "sk-explicit");
    }

    #[test]
    fn missing_env_key_is_not_configured() {
        temp_env::with_var_unset("DRAFTGATE_TEST_LLM_KEY", || {
            let provider = OpenAiCompatProvider::new(test_config());
            let err = provider.resolve_api_key().unwrap_err();
            assert!(matches!(err, ProviderError::NotConfigured(_)));
            assert!(err.to_string().contains("DRAFTGATE_TEST_LLM_KEY"));
        });
    }

    #[test]
    fn env_key_is_used() {
        temp_env::with_var("DRAFTGATE_TEST_LLM_KEY", Some("sk-env"), || {
            let provider = OpenAiCompatProvider::new(test_config());
            assert_eq!(provider.resolve_api_key().unwrap(), "sk-env");
        });
    }

    #[test]
    fn extract_error_message_formats() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"bad key"}}"#).as_deref(),
            Some("bad key")
        );
        assert_eq!(
            extract_error_message(r#"{"error":"quota"}"#).as_deref(),
            Some("quota")
        );
        assert!(extract_error_message("plain text").is_none());
    }

    #[test]
    fn debug_hides_api_key() {
        let provider = OpenAiCompatProvider::with_api_key(test_config(), "sk-secret".into());
        let dbg = format!("{provider:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("***"));
    }
}
