//! Persisted OAuth2 token material.

use serde::{Deserialize, Serialize};

/// Token material bound to one principal.
///
/// A credential fresh from the authorization flow has an empty
/// `principal`; the caller binds it with [`Credential::bind`] once the
/// mail provider has reported who authenticated.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Email address of the principal the tokens belong to.
    #[serde(default)]
    pub principal: String,

    /// Access token.
    pub access_token: String,

    /// Refresh token, when the provider issued one.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Token type (usually "Bearer").
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Expiration time (Unix seconds).
    #[serde(default)]
    pub expires_at: Option<i64>,

    /// Scopes granted by the server.
    #[serde(default)]
    pub scopes: Vec<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Credential {
    /// Expiry check with a 60-second buffer. No expiry means valid.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| chrono::Utc::now().timestamp() >= at - 60)
    }

    /// Attach the principal's email address.
    pub fn bind(mut self, principal: impl Into<String>) -> Self {
        self.principal = principal.into();
        self
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("principal", &self.principal)
            .field("access_token", &"***")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(expires_at: Option<i64>) -> Credential {
        Credential {
            principal: String::new(),
            access_token: "ya29.secret".into(),
            refresh_token: Some("1//refresh".into()),
            token_type: "Bearer".into(),
            expires_at,
            scopes: vec![],
        }
    }

    #[test]
    fn expired_long_ago() {
        assert!(credential(Some(0)).is_expired());
    }

    #[test]
    fn within_buffer_counts_as_expired() {
        let soon = chrono::Utc::now().timestamp() + 30;
        assert!(credential(Some(soon)).is_expired());
    }

    #[test]
    fn future_and_missing_expiry_are_valid() {
        let later = chrono::Utc::now().timestamp() + 3600;
        assert!(!credential(Some(later)).is_expired());
        assert!(!credential(None).is_expired());
    }

    #[test]
    fn bind_sets_principal() {
        let c = credential(None).bind("ana@kogo.ai");
        assert_eq!(c.principal, "ana@kogo.ai");
    }

    #[test]
    fn debug_redacts_tokens() {
        let dbg = format!("{:?}", credential(None));
        assert!(!dbg.contains("ya29.secret"));
        assert!(!dbg.contains("1//refresh"));
    }

    #[test]
    fn deserialize_fills_defaults() {
        let c: Credential = serde_json::from_str(r#"{"access_token":"t"}"#).unwrap();
        assert_eq!(c.token_type, "Bearer");
        assert!(c.principal.is_empty());
        assert!(c.refresh_token.is_none());
    }
}
