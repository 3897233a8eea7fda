//! Recommendation service: prompt, one provider call, sanitized markup.
//!
//! [`RecommendationService::recommend`] never fails. Transport errors,
//! timeouts and empty answers all collapse into the fixed fallback fragment
//! and are only visible in the logs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::profile::PreferenceProfile;
use crate::prompt::build_prompt;
use crate::providers::{LlmProvider, ProviderError};
use crate::sanitize::{clean, FALLBACK_FRAGMENT};

/// Default deadline for one provider call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Markup returned to the caller, either a provider answer or the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationResult {
    markup: String,
    provider: Option<String>,
}

impl RecommendationResult {
    /// The fixed fallback fragment.
    pub fn fallback() -> Self {
        Self {
            markup: FALLBACK_FRAGMENT.to_owned(),
            provider: None,
        }
    }

    fn from_provider(markup: String, model_id: &str) -> Self {
        Self {
            markup,
            provider: Some(model_id.to_owned()),
        }
    }

    /// Render-ready markup; never empty.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Consume the result, keeping only the markup.
    pub fn into_markup(self) -> String {
        self.markup
    }

    /// Model id that produced the markup, `None` for the fallback.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Whether this is the fallback fragment.
    pub fn is_fallback(&self) -> bool {
        self.provider.is_none()
    }
}

/// Orchestrates prompt building, the provider call and sanitization.
#[derive(Clone)]
pub struct RecommendationService {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl std::fmt::Debug for RecommendationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationService")
            .field("provider", &self.provider.model_id())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RecommendationService {
    /// Create a service around the active provider.
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Model id of the active provider.
    pub fn model_id(&self) -> &str {
        self.provider.model_id()
    }

    /// Produce a recommendation for a submitted profile.
    ///
    /// Issues exactly one provider call bounded by the configured timeout.
    /// When the deadline passes, the in-flight call is dropped.
    pub async fn recommend(&self, profile: &PreferenceProfile) -> RecommendationResult {
        let prompt = build_prompt(profile);
        let model_id = self.provider.model_id();
        let started = Instant::now();

        let outcome = match tokio::time::timeout(self.timeout, self.provider.generate(&prompt)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                after: self.timeout,
            }),
        };

        let raw = match outcome {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    model = model_id,
                    error = %e,
                    elapsed = ?started.elapsed(),
                    "provider call failed, serving fallback"
                );
                return RecommendationResult::fallback();
            }
        };

        match clean(&raw) {
            Some(markup) => {
                info!(
                    model = model_id,
                    elapsed = ?started.elapsed(),
                    markup_len = markup.len(),
                    "recommendation generated"
                );
                RecommendationResult::from_provider(markup, model_id)
            }
            None => {
                warn!(
                    model = model_id,
                    elapsed = ?started.elapsed(),
                    "provider returned no usable content, serving fallback"
                );
                RecommendationResult::fallback()
            }
        }
    }
}
