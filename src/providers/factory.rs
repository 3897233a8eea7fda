//! Builds the single active provider from config and credentials.

use std::sync::Arc;

use tracing::info;

use crate::config::ProviderConfig;
use crate::credentials::{resolve_api_key, Credentials};

use super::openai::OpenAiCompatProvider;
use super::{LlmProvider, ProviderKind};

/// Provider construction errors.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// Required API credential missing for the selected provider.
    #[error("missing credential for provider '{provider}': set one of {keys}")]
    MissingCredential {
        /// Provider name.
        provider: ProviderKind,
        /// Accepted credential names.
        keys: String,
    },
    /// Configured endpoint is not an absolute http(s) URL.
    #[error("invalid endpoint '{endpoint}' for provider '{provider}': {reason}")]
    InvalidEndpoint {
        /// Provider name.
        provider: ProviderKind,
        /// Offending endpoint.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Build the configured provider.
///
/// # Errors
///
/// Returns [`FactoryError`] when no credential is available or the endpoint
/// override is not a valid URL.
pub fn build_provider(
    config: &ProviderConfig,
    credentials: &Credentials,
) -> Result<Arc<dyn LlmProvider>, FactoryError> {
    let kind = config.active;
    let endpoint = validate_endpoint(kind, config.endpoint())?;

    let api_key = resolve_api_key(kind, credentials).ok_or_else(|| FactoryError::MissingCredential {
        provider: kind,
        keys: kind.credential_keys().join(" or "),
    })?;

    let provider = OpenAiCompatProvider::new(kind, endpoint, config.model_name().to_owned(), api_key)
        .with_max_tokens(config.max_tokens);

    info!(
        provider = %kind,
        model = provider.model_id(),
        endpoint = provider.endpoint(),
        "provider wired"
    );
    Ok(Arc::new(provider))
}

fn validate_endpoint(kind: ProviderKind, raw: &str) -> Result<String, FactoryError> {
    let invalid = |reason: String| FactoryError::InvalidEndpoint {
        provider: kind,
        endpoint: raw.to_owned(),
        reason,
    };
    let parsed = url::Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
