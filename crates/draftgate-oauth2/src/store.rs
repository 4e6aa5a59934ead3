//! Per-principal credential persistence.
//!
//! Credentials live at `<dir>/token_<email>.json` with 0600 file
//! permissions inside a 0700 directory. Writes go to a temp file that is
//! renamed into place, so a crash never leaves a half-written credential.

use std::fs;
use std::path::{Path, PathBuf};

use draftgate_types::{DraftgateError, Result};
use tracing::debug;

use crate::credential::Credential;

const FILE_PREFIX: &str = "token_";
const FILE_SUFFIX: &str = ".json";

/// Credential storage manager.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    base_dir: PathBuf,
}

impl CredentialStore {
    /// A store rooted at `dir`.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: dir.into(),
        }
    }

    /// The directory credential files are kept in.
    pub fn dir(&self) -> &Path {
        &self.base_dir
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.base_dir.exists() {
            fs::create_dir_all(&self.base_dir)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&self.base_dir, fs::Permissions::from_mode(0o700))?;
            }
        }
        Ok(())
    }

    /// Path of the credential file for `email`.
    ///
    /// The email is lowercased. Values that could escape the directory
    /// or are not addresses at all are rejected.
    pub fn credential_path(&self, email: &str) -> Result<PathBuf> {
        let key = file_key(email)?;
        Ok(self.base_dir.join(format!("{FILE_PREFIX}{key}{FILE_SUFFIX}")))
    }

    /// Persist `credential` under its principal, replacing any previous file.
    pub fn store(&self, credential: &Credential) -> Result<()> {
        let path = self.credential_path(&credential.principal)?;
        self.ensure_dir()?;

        let json = serde_json::to_string_pretty(credential)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        set_owner_only(&tmp_path)?;
        fs::rename(&tmp_path, &path)?;

        debug!(principal = %credential.principal, path = %path.display(), "stored credential");
        Ok(())
    }

    /// Load the credential for `email`, if one exists.
    pub fn load(&self, email: &str) -> Result<Option<Credential>> {
        let path = self.credential_path(email)?;
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        let credential: Credential = serde_json::from_str(&json)?;

        debug!(principal = %email, "loaded credential");
        Ok(Some(credential))
    }

    /// Whether a credential file exists for `email`.
    pub fn exists(&self, email: &str) -> Result<bool> {
        Ok(self.credential_path(email)?.exists())
    }

    /// Delete the credential for `email`. Returns `false` if there was none.
    pub fn delete(&self, email: &str) -> Result<bool> {
        let path = self.credential_path(email)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        debug!(principal = %email, "deleted credential");
        Ok(true)
    }

    /// Principals with a stored credential, sorted.
    pub fn principals(&self) -> Result<Vec<String>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut out: Vec<String> = fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                name.strip_prefix(FILE_PREFIX)?
                    .strip_suffix(FILE_SUFFIX)
                    .map(str::to_owned)
            })
            .collect();
        out.sort();
        Ok(out)
    }
}

fn file_key(email: &str) -> Result<String> {
    let key = email.trim().to_lowercase();
    let reject = |reason: &str| {
        Err(DraftgateError::SecurityViolation {
            reason: format!("refusing credential path for '{email}': {reason}"),
        })
    };

    if !key.contains('@') {
        return reject("not an email address");
    }
    if key.contains(['/', '\\', '\0']) {
        return reject("path separator");
    }
    if key.contains("..") || key.starts_with('.') {
        return reject("relative path component");
    }
    Ok(key)
}

fn set_owner_only(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }

    Ok(())
}
