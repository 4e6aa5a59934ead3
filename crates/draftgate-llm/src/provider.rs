//! The [`Provider`] trait for LLM chat completions.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChatRequest, ChatResponse};

/// A provider that can execute chat completion requests.
///
/// Implementations handle authentication, request formatting, and
/// response parsing for one API. [`OpenAiCompatProvider`](crate::OpenAiCompatProvider)
/// is the concrete implementation; tests substitute their own.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// The model to use when a caller does not pick one.
    fn default_model(&self) -> &str;

    /// Execute one chat completion request.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`](crate::ProviderError) on network,
    /// authentication, rate-limit, or parse failures. Nothing is retried.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;
}
