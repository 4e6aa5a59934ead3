//! Configuration file discovery and loading.
//!
//! Discovery order:
//! 1. An explicit path passed by the caller (`--config`).
//! 2. The `DRAFTGATE_CONFIG` environment variable.
//! 3. `~/.draftgate/config.json`.
//!
//! When nothing is found the defaults are used. JSON keys are
//! normalized from camelCase to snake_case before deserialization.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{DraftgateError, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "DRAFTGATE_CONFIG";

/// Find the config file to load, if any.
///
/// A path named by `DRAFTGATE_CONFIG` is returned even when it does not
/// exist, so that the caller reports the mistake instead of silently
/// falling back to defaults.
pub fn discover_config_path(home_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    let candidate = home_dir?.join(".draftgate").join("config.json");
    candidate.exists().then_some(candidate)
}

/// Load the configuration, honoring an explicit path override.
pub fn load_config(path_override: Option<&Path>) -> Result<Config> {
    let path = match path_override {
        Some(p) => Some(p.to_path_buf()),
        None => discover_config_path(dirs::home_dir()),
    };

    let Some(path) = path else {
        info!("no config file found, using defaults");
        return Ok(Config::default());
    };

    load_config_file(&path)
}

/// Load and parse one config file.
pub fn load_config_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(DraftgateError::ConfigInvalid {
            reason: format!("config file not found: {}", path.display()),
        });
    }

    debug!(path = %path.display(), "loading config file");
    let contents = std::fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&contents).map_err(|e| {
        DraftgateError::ConfigInvalid {
            reason: format!("failed to parse {}: {e}", path.display()),
        }
    })?;

    Ok(serde_json::from_value(normalize_keys(raw))?)
}

/// Convert camelCase object keys to snake_case, recursively.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (camel_to_snake(&k), normalize_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Convert one camelCase identifier to snake_case.
///
/// A run of capitals is treated as one acronym: `"tokenURL"` becomes
/// `"token_url"` and `"HTTPTimeout"` becomes `"http_timeout"`.
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.push(ch.to_ascii_lowercase());
    }
    out
}
