//! Configuration schema.
//!
//! Every field has a serde default so that an empty file (or no file)
//! yields a usable configuration. Keys may be written in camelCase; the
//! [`loader`](crate::loader) normalizes them before deserialization.
//!
//! The domain allow-list is intentionally absent: it is compiled into
//! the access gate and cannot be changed from a config file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DraftgateError, Result};
use crate::secret::{SecretRef, SecretString};

/// Gmail compose scope: create, send, and delete drafts.
pub const GMAIL_COMPOSE_SCOPE: &str = "https://www.googleapis.com/auth/gmail.compose";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// OAuth2 client used to authenticate against the mail provider.
    #[serde(default)]
    pub oauth: OAuthConfig,

    /// Language model used to write email content.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Mail provider API settings.
    #[serde(default)]
    pub gmail: GmailConfig,

    /// Credential file location.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Check the settings needed before an OAuth handshake can start.
    pub fn validate_oauth(&self) -> Result<()> {
        if self.oauth.client_id.trim().is_empty() {
            return Err(DraftgateError::ConfigInvalid {
                reason: "oauth.client_id is empty".into(),
            });
        }
        if self.oauth.preset == OAuthPreset::Custom
            && (self.oauth.auth_url.is_none() || self.oauth.token_url.is_none())
        {
            return Err(DraftgateError::ConfigInvalid {
                reason: "oauth.auth_url and oauth.token_url are required for the custom preset"
                    .into(),
            });
        }
        Ok(())
    }
}

/// OAuth2 endpoint presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthPreset {
    /// Google accounts (Gmail).
    Google,
    /// Explicit `auth_url` / `token_url`.
    Custom,
}

/// OAuth2 installed-application client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Endpoint preset.
    #[serde(default = "default_preset")]
    pub preset: OAuthPreset,

    /// OAuth2 client ID.
    #[serde(default)]
    pub client_id: String,

    /// Environment variable holding the client secret.
    #[serde(default = "default_client_secret_ref")]
    pub client_secret_ref: SecretRef,

    /// Authorization endpoint (custom preset only).
    #[serde(default)]
    pub auth_url: Option<String>,

    /// Token endpoint (custom preset only).
    #[serde(default)]
    pub token_url: Option<String>,

    /// Scopes to request.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

fn default_preset() -> OAuthPreset {
    OAuthPreset::Google
}

fn default_client_secret_ref() -> SecretRef {
    SecretRef::env("DRAFTGATE_CLIENT_SECRET")
}

fn default_scopes() -> Vec<String> {
    vec![GMAIL_COMPOSE_SCOPE.to_string()]
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            client_id: String::new(),
            client_secret_ref: default_client_secret_ref(),
            auth_url: None,
            token_url: None,
            scopes: default_scopes(),
        }
    }
}

impl OAuthConfig {
    /// Authorization endpoint for the configured preset.
    pub fn auth_endpoint(&self) -> Result<String> {
        match self.preset {
            OAuthPreset::Google => Ok("https://accounts.google.com/o/oauth2/v2/auth".into()),
            OAuthPreset::Custom => self.auth_url.clone().ok_or_else(|| {
                DraftgateError::ConfigInvalid {
                    reason: "auth_url required for custom preset".into(),
                }
            }),
        }
    }

    /// Token endpoint for the configured preset.
    pub fn token_endpoint(&self) -> Result<String> {
        match self.preset {
            OAuthPreset::Google => Ok("https://oauth2.googleapis.com/token".into()),
            OAuthPreset::Custom => self.token_url.clone().ok_or_else(|| {
                DraftgateError::ConfigInvalid {
                    reason: "token_url required for custom preset".into(),
                }
            }),
        }
    }
}

/// Language model settings (OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the chat completions API.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Inline API key; takes precedence over `api_key_env` when set.
    #[serde(default)]
    pub api_key: SecretString,

    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            api_key: SecretString::default(),
            timeout_secs: None,
        }
    }
}

/// Gmail REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailConfig {
    /// Base URL for the authenticated user's resources.
    #[serde(default = "default_gmail_base_url")]
    pub base_url: String,
}

fn default_gmail_base_url() -> String {
    "https://gmail.googleapis.com/gmail/v1/users/me".into()
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            base_url: default_gmail_base_url(),
        }
    }
}

/// Where credential files live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the token directory (default `~/.draftgate/tokens`).
    #[serde(default)]
    pub tokens_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// The effective token directory.
    pub fn resolve_tokens_dir(&self) -> PathBuf {
        self.tokens_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".draftgate")
                .join("tokens")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.oauth.preset, OAuthPreset::Google);
        assert_eq!(config.oauth.scopes, vec![GMAIL_COMPOSE_SCOPE.to_string()]);
        assert_eq!(config.oauth.client_secret_ref.env_var, "DRAFTGATE_CLIENT_SECRET");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert!(config.llm.api_key.is_empty());
        assert!(config.gmail.base_url.starts_with("https://gmail.googleapis.com"));
        assert!(config.storage.tokens_dir.is_none());
    }

    #[test]
    fn google_endpoints() {
        let oauth = OAuthConfig::default();
        assert!(oauth.auth_endpoint().unwrap().contains("accounts.google.com"));
        assert!(oauth.token_endpoint().unwrap().contains("oauth2.googleapis.com"));
    }

    #[test]
    fn custom_preset_requires_urls() {
        let oauth = OAuthConfig {
            preset: OAuthPreset::Custom,
            ..OAuthConfig::default()
        };
        assert!(oauth.auth_endpoint().is_err());
        assert!(oauth.token_endpoint().is_err());
    }

    #[test]
    fn validate_oauth_requires_client_id() {
        let mut config = Config::default();
        assert!(config.validate_oauth().is_err());
        config.oauth.client_id = "client-123.apps.googleusercontent.com".into();
        assert!(config.validate_oauth().is_ok());
    }

    #[test]
    fn validate_oauth_custom_without_urls_fails() {
        let mut config = Config::default();
        config.oauth.client_id = "id".into();
        config.oauth.preset = OAuthPreset::Custom;
        config.oauth.auth_url = Some("http://localhost/auth".into());
        assert!(config.validate_oauth().is_err());
        config.oauth.token_url = Some("http://localhost/token".into());
        assert!(config.validate_oauth().is_ok());
    }

    #[test]
    fn tokens_dir_override() {
        let storage = StorageConfig {
            tokens_dir: Some(PathBuf::from("/tmp/draftgate-tokens")),
        };
        assert_eq!(
            storage.resolve_tokens_dir(),
            PathBuf::from("/tmp/draftgate-tokens")
        );
    }

    #[test]
    fn default_tokens_dir_is_under_draftgate() {
        let dir = StorageConfig::default().resolve_tokens_dir();
        assert!(dir.ends_with(".draftgate/tokens"));
    }

    #[test]
    fn inline_api_key_is_not_serialized() {
        let mut config = Config::default();
        config.llm.api_key = SecretString::new("sk-inline");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-inline"));
    }
}
