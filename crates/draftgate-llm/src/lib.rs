//! LLM provider abstraction for draftgate.
//!
//! - [`Provider`] trait defines the single-shot chat completion interface
//! - [`OpenAiCompatProvider`] implements it for any OpenAI-compatible API
//! - [`LlmProviderConfig`] describes how to connect to a provider
//!
//! Calls are made once: there is no retry, failover, or streaming layer.
//! A rate-limit response is surfaced as [`ProviderError::RateLimited`]
//! and left to the caller.

pub mod config;
pub mod error;
pub mod openai_compat;
pub mod provider;
pub mod types;

pub use config::LlmProviderConfig;
pub use error::{ProviderError, Result};
pub use openai_compat::OpenAiCompatProvider;
pub use provider::Provider;
pub use types::{ChatMessage, ChatRequest, ChatResponse, Choice, ResponseFormat, Usage};
