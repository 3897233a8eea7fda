//! Provider API keys from the runtime `.env` file and the process environment.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::config::RuntimePaths;
use crate::providers::ProviderKind;

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

    /// Overlay values from an environment resolver for the given keys.
    ///
    /// Non-blank environment values replace file values.
    pub fn overlay(&mut self, keys: &[&str], env: impl Fn(&str) -> Option<String>) {
        for key in keys {
            if let Some(value) = env(key).filter(|v| !v.trim().is_empty()) {
                self.vars.insert((*key).to_owned(), value);
            }
        }
    }
}

/// Resolve the API key for a backend, trying its credential names in order.
pub fn resolve_api_key(kind: ProviderKind, credentials: &Credentials) -> Option<String> {
    kind.credential_keys().iter().find_map(|key| {
        let value = credentials.get(key)?.trim();
        if value.is_empty() {
            return None;
        }
        debug!(provider = %kind, key = *key, "resolved provider credential");
        Some(value.to_owned())
    })
}

/// Load credentials from a specific `.env` path.
///
/// # Errors
///
/// Returns an error if the file does not exist, permissions are too broad,
/// or parsing fails.
pub fn load_credentials(path: &Path) -> anyhow::Result<Credentials> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "credentials file does not exist: {}",
            path.display()
        ));
    }

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

/// Load runtime credentials: the optional `.env` file overlaid by the
/// process environment for every known provider key.
///
/// # Errors
///
/// Returns an error when the `.env` file exists but is unreadable, too
/// permissive, or malformed.
pub fn load_runtime_credentials(paths: &RuntimePaths) -> anyhow::Result<Credentials> {
    let mut credentials = if paths.env_file.exists() {
        load_credentials(&paths.env_file)?
    } else {
        debug!(path = %paths.env_file.display(), "no credentials file, using environment only");
        Credentials::default()
    };

    for kind in ProviderKind::iter() {
        credentials.overlay(kind.credential_keys(), |key| std::env::var(key).ok());
    }
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
