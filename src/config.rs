//! Configuration loading and validation.
//!
//! Config lives in `~/.sommelier/config.toml` (or `$SOMMELIER_CONFIG`, or the
//! `--config` flag). A missing file means defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::providers::ProviderKind;

/// Default bind address for the HTTP API.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Active provider settings.
    pub provider: ProviderConfig,

    /// HTTP API settings.
    pub server: ServerConfig,
}

/// Which provider is wired in, and how it is called.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// The single active backend.
    pub active: ProviderKind,

    /// Model override; the backend default is used when absent.
    pub model: Option<String>,

    /// Endpoint override; the backend default is used when absent.
    pub base_url: Option<String>,

    /// Deadline for one provider call, in seconds.
    pub timeout_secs: u64,

    /// Completion token ceiling.
    pub max_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            active: ProviderKind::default(),
            model: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl ProviderConfig {
    /// Deadline for one provider call.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Model name after applying the override.
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.active.default_model())
    }

    /// Endpoint URL after applying the override.
    pub fn endpoint(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| self.active.default_endpoint())
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_owned(),
        }
    }
}

// Default value functions for serde

fn default_timeout_secs() -> u64 {
    crate::recommend::DEFAULT_TIMEOUT.as_secs()
}
fn default_max_tokens() -> u32 {
    crate::providers::openai::DEFAULT_MAX_TOKENS
}

impl Config {
    /// Parse a TOML string into config.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has wrong field types.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_str).context("failed to parse config TOML")
    }

    /// Reject settings that would make every request fail.
    ///
    /// # Errors
    ///
    /// Returns an error when `provider.timeout_secs` is zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.provider.timeout_secs == 0 {
            anyhow::bail!("provider.timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function so tests need not touch the process env.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("SOMMELIER_PROVIDER") {
            match v.parse() {
                Ok(kind) => self.provider.active = kind,
                Err(_) => tracing::warn!(
                    var = "SOMMELIER_PROVIDER",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("SOMMELIER_MODEL") {
            self.provider.model = Some(v);
        }
        if let Some(v) = env("SOMMELIER_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.provider.timeout_secs = n,
                Err(_) => tracing::warn!(
                    var = "SOMMELIER_TIMEOUT_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("SOMMELIER_BIND") {
            self.server.bind = v;
        }
    }
}

/// Load config from a TOML file; a missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            tracing::debug!(path = %path.display(), "loading config from file");
            toml::from_str(&contents)
                .map_err(|e| anyhow::anyhow!("failed to parse config at {}: {e}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(anyhow::anyhow!(
            "failed to read config at {}: {e}",
            path.display()
        )),
    }
}

/// Load config from `path` (or the default location) and apply env overrides.
///
/// # Errors
///
/// Returns an error if paths cannot be resolved, the file is invalid, or the
/// resulting settings fail [`Config::validate`].
pub fn load_effective_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match std::env::var("SOMMELIER_CONFIG") {
            Ok(p) => PathBuf::from(p),
            Err(_) => runtime_paths()?.config_toml,
        },
    };
    let mut config = load_config(&path)?;
    config.apply_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Filesystem locations used at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    /// Root directory (`~/.sommelier`).
    pub root: PathBuf,
    /// Config file.
    pub config_toml: PathBuf,
    /// Credentials file.
    pub env_file: PathBuf,
    /// Log directory for the API server.
    pub logs_dir: PathBuf,
}

impl RuntimePaths {
    /// Derive every path from a root directory.
    pub fn from_root(root: PathBuf) -> Self {
        Self {
            config_toml: root.join("config.toml"),
            env_file: root.join(".env"),
            logs_dir: root.join("logs"),
            root,
        }
    }
}

/// Resolve the default config directory (`~/.sommelier/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".sommelier"))
}

/// Resolve all runtime paths under [`config_dir`].
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn runtime_paths() -> anyhow::Result<RuntimePaths> {
    Ok(RuntimePaths::from_root(config_dir()?))
}
