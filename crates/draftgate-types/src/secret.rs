//! Secret values that must never reach logs or serialized output.
//!
//! [`SecretString`] wraps an in-memory secret (an inline API key, a
//! resolved OAuth client secret). [`SecretRef`] names the environment
//! variable a secret is read from, so configuration files never carry
//! the plaintext.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DraftgateError, Result};

/// A string that prints as `[REDACTED]` and serializes as `""`.
///
/// Deserialization accepts a plain string so that a config file may
/// still provide the value inline. Use [`expose`](SecretString::expose)
/// only at the point the secret is sent on the wire.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The actual secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no secret was provided.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("\"\"")
        } else {
            f.write_str("\"[REDACTED]\"")
        }
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.0.is_empty() {
            f.write_str("[REDACTED]")?;
        }
        Ok(())
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str("")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(SecretString)
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        SecretString(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        SecretString(s.to_owned())
    }
}

/// Reference to a secret held in an environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRef {
    /// Name of the environment variable containing the secret.
    pub env_var: String,
}

impl SecretRef {
    /// Reference the given environment variable.
    pub fn env(name: impl Into<String>) -> Self {
        Self {
            env_var: name.into(),
        }
    }

    /// Read the secret from the environment.
    ///
    /// An unset or empty variable is an error.
    pub fn resolve(&self) -> Result<SecretString> {
        match std::env::var(&self.env_var) {
            Ok(value) if !value.is_empty() => Ok(SecretString(value)),
            _ => Err(DraftgateError::SecretUnavailable(format!(
                "environment variable '{}' not set",
                self.env_var
            ))),
        }
    }
}
