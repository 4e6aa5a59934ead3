//! Provider connection settings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Configuration for one OpenAI-compatible endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    /// Provider name used in logs (e.g. "openai").
    pub name: String,

    /// Base URL of the API (e.g. "https://api.openai.com/v1").
    pub base_url: String,

    /// Environment variable that holds the API key.
    pub api_key_env: String,

    /// Model used for every request built by draftgate.
    pub default_model: String,

    /// Extra HTTP headers sent with every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Request timeout in seconds. `None` waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl LlmProviderConfig {
    /// OpenAI defaults with the given model.
    pub fn openai(model: impl Into<String>) -> Self {
        Self {
            name: "openai".into(),
            base_url: "https://api.openai.com/v1".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            default_model: model.into(),
            headers: HashMap::new(),
            timeout_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_preset() {
        let config = LlmProviderConfig::openai("gpt-4o-mini");
        assert_eq!(config.name, "openai");
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn deserialize_without_optional_fields() {
        let config: LlmProviderConfig = serde_json::from_str(
            r#"{"name":"local","base_url":"http://localhost:8000/v1",
                "api_key_env":"LOCAL_KEY","default_model":"llama"}"#,
        )
        .unwrap();
        assert!(config.headers.is_empty());
        assert_eq!(config.timeout_secs, None);
    }
}
