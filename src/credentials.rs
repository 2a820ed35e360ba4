//! Credential loading from the process environment and `~/.quill/.env`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::config::config_dir;

/// Key holding the OpenAI-compatible API key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Keys consulted in the process environment before the `.env` file.
const KNOWN_KEYS: &[&str] = &[OPENAI_API_KEY];

/// Runtime credentials.
#[derive(Clone, Default)]
pub struct Credentials {
    vars: BTreeMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from a key-value map.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Returns a credential value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Overlay values from `env` for the known keys. Env wins over file.
    pub fn overlay_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        for key in KNOWN_KEYS {
            if let Some(value) = env(key).filter(|v| !v.trim().is_empty()) {
                debug!(key = *key, "credential taken from environment");
                self.vars.insert((*key).to_owned(), value);
            }
        }
    }
}

/// Parse a `.env` file. The file must not be readable by group or others.
///
/// # Errors
///
/// Returns an error if the file cannot be read, its permissions are too
/// broad, or an entry fails to parse.
pub fn load_credentials(path: &Path) -> anyhow::Result<Credentials> {
    validate_private_permissions(path)?;

    let mut vars = BTreeMap::new();
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("failed to read credentials at {}", path.display()))?;

    for item in iter {
        let (key, value) = item.with_context(|| {
            format!(
                "failed to parse key-value entry in credentials file {}",
                path.display()
            )
        })?;
        vars.insert(key, value);
    }

    Ok(Credentials { vars })
}

/// Load `~/.quill/.env` when it exists, then overlay the process env.
///
/// # Errors
///
/// Returns an error if the home directory cannot be resolved or an existing
/// `.env` file is malformed.
pub fn load_default_credentials() -> anyhow::Result<Credentials> {
    let path = config_dir()?.join(".env");
    let mut credentials = if fs::metadata(&path).is_ok() {
        load_credentials(&path)?
    } else {
        Credentials::default()
    };
    credentials.overlay_env(|key| std::env::var(key).ok());
    Ok(credentials)
}

#[cfg(unix)]
fn validate_private_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)
        .with_context(|| format!("failed to inspect credentials file {}", path.display()))?;
    let mode = metadata.permissions().mode() & 0o777;

    if mode & 0o077 != 0 {
        return Err(anyhow::anyhow!(
            "credentials file {} must be 0600, found {:o}",
            path.display(),
            mode
        ));
    }

    Ok(())
}

#[cfg(not(unix))]
fn validate_private_permissions(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}
