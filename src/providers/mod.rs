//! Text-generation provider abstraction.
//!
//! Defines the [`LlmProvider`] capability the recommendation service depends
//! on, the catalogue of supported backends ([`ProviderKind`]) and the shared
//! error type.
//!
//! Every supported backend speaks the OpenAI chat-completions wire format, so
//! a single adapter ([`openai::OpenAiCompatProvider`]) serves all of them.
//! [`factory::build_provider`] wires the configured variant at startup.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub mod factory;
pub mod openai;

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// Supported text-generation backends.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    /// OpenAI.
    #[default]
    OpenAi,
    /// xAI Grok.
    #[strum(to_string = "grok", serialize = "xai")]
    Grok,
    /// DeepSeek.
    DeepSeek,
}

impl ProviderKind {
    /// Chat-completions endpoint used unless overridden in config.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1/chat/completions",
            Self::Grok => "https://api.x.ai/v1/chat/completions",
            Self::DeepSeek => "https://api.deepseek.com/chat/completions",
        }
    }

    /// Model identifier used unless overridden in config.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Grok => "grok-2-latest",
            Self::DeepSeek => "deepseek-chat",
        }
    }

    /// Credential names checked, in order, for the API key.
    pub fn credential_keys(self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["OPENAI_API_KEY", "OPEN_API_KEY"],
            Self::Grok => &["GROK_API_KEY", "XAI_API_KEY"],
            Self::DeepSeek => &["DEEPSEEK_API_KEY"],
        }
    }

    /// Whether requests carry the sommelier system message.
    pub fn sends_system_prompt(self) -> bool {
        !matches!(self, Self::DeepSeek)
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Conversation participant role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message.
    System,
    /// Human user message.
    User,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UsageStats {
    /// Tokens used in the prompt.
    pub input_tokens: u32,
    /// Tokens generated in the response.
    pub output_tokens: u32,
}

/// A single completion returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Completion text; `None` when the provider returned no content.
    pub text: Option<String>,
    /// Model that served the request, as reported by the provider.
    pub model: String,
    /// Why generation stopped, if reported.
    pub finish_reason: Option<String>,
    /// Token usage.
    pub usage: UsageStats,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure.
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match the expected schema.
    #[error("provider response parse error: {0}")]
    Parse(String),
    /// Upstream provider responded with an error status.
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Redacted, truncated response body.
        body: String,
    },
    /// The call did not finish within the configured deadline.
    #[error("provider call timed out after {after:?}")]
    Timeout {
        /// Deadline that elapsed.
        after: Duration,
    },
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns `ProviderError::Request` on transport failure, `ProviderError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [
        r"sk-proj-[A-Za-z0-9_\-]{16,}",
        r"sk-[A-Za-z0-9]{32,}",
        r"xai-[A-Za-z0-9]{20,}",
        r"Bearer [A-Za-z0-9._\-]{16,}",
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Single-call text generation capability.
///
/// Implementations must be `Send + Sync`: one instance is created at startup
/// and shared by every request.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for the given instruction text.
    ///
    /// Exactly one outbound call, no retry. An empty string means the
    /// provider answered without content.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, auth, API, or parse failure.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// The `<provider>/<model>` identifier this instance serves.
    fn model_id(&self) -> &str;
}
