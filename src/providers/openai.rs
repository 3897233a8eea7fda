//! OpenAI-compatible `/chat/completions` provider.
//!
//! OpenAI, Grok and DeepSeek share this wire format; a [`ProviderKind`]
//! selects the endpoint, model and whether a system message is sent.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prompt::SOMMELIER_SYSTEM_PROMPT;

use super::{check_http_response, Completion, LlmProvider, ProviderError, ProviderKind, Role, UsageStats};

/// Default completion token ceiling.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Chat completions API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Maximum completion tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A message in chat completions format.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: Role,
    /// Plain text content.
    pub content: String,
}

/// Chat completions API response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Response choices.
    pub choices: Vec<ChatChoice>,
    /// Model that served the response.
    #[serde(default)]
    pub model: String,
    /// Token usage.
    pub usage: Option<ChatUsage>,
}

/// A response choice.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// Assistant message for this choice.
    pub message: ChatResponseMessage,
    /// Why generation stopped.
    pub finish_reason: Option<String>,
}

/// Assistant message in a response choice.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    /// Optional text content.
    pub content: Option<String>,
}

/// Usage statistics.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    /// Prompt token count.
    pub prompt_tokens: Option<u32>,
    /// Completion token count.
    pub completion_tokens: Option<u32>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Provider for any OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    kind: ProviderKind,
    model_spec: String,
    model_name: String,
    endpoint: String,
    api_key: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("kind", &self.kind)
            .field("model_spec", &self.model_spec)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiCompatProvider {
    /// Create a provider for `kind` targeting `endpoint` with `model_name`.
    pub fn new(kind: ProviderKind, endpoint: String, model_name: String, api_key: String) -> Self {
        Self {
            kind,
            model_spec: format!("{kind}/{model_name}"),
            model_name,
            endpoint,
            api_key,
            max_tokens: DEFAULT_MAX_TOKENS,
            client: reqwest::Client::new(),
        }
    }

    /// Create a provider using the kind's default endpoint and model.
    pub fn with_defaults(kind: ProviderKind, api_key: String) -> Self {
        Self::new(
            kind,
            kind.default_endpoint().to_owned(),
            kind.default_model().to_owned(),
            api_key,
        )
    }

    /// Override the completion token ceiling.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Backend this provider talks to.
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Endpoint URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one chat completion request and parse the first choice.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failure, non-2xx status, or an
    /// unparseable body.
    pub async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
        let request = build_request(self.kind, &self.model_name, prompt, Some(self.max_tokens));

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build the request body: optional system message, then the prompt as the
/// single user message.
#[doc(hidden)]
pub fn build_request(
    kind: ProviderKind,
    model: &str,
    prompt: &str,
    max_tokens: Option<u32>,
) -> ChatRequest {
    let mut messages = Vec::with_capacity(2);
    if kind.sends_system_prompt() {
        messages.push(ChatMessage {
            role: Role::System,
            content: SOMMELIER_SYSTEM_PROMPT.to_owned(),
        });
    }
    messages.push(ChatMessage {
        role: Role::User,
        content: prompt.to_owned(),
    });

    ChatRequest {
        model: model.to_owned(),
        messages,
        max_tokens,
    }
}

/// Parse a chat completions response body.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the body cannot be deserialized or has
/// no choices.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<Completion, ProviderError> {
    let resp: ChatResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("missing choices[0]".to_owned()))?;

    let usage = UsageStats {
        input_tokens: resp
            .usage
            .as_ref()
            .and_then(|u| u.prompt_tokens)
            .unwrap_or(0),
        output_tokens: resp
            .usage
            .as_ref()
            .and_then(|u| u.completion_tokens)
            .unwrap_or(0),
    };

    Ok(Completion {
        text: choice.message.content.filter(|text| !text.is_empty()),
        model: resp.model,
        finish_reason: choice.finish_reason,
        usage,
    })
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let completion = self.complete(prompt).await?;
        debug!(
            model = %completion.model,
            finish_reason = completion.finish_reason.as_deref().unwrap_or("unknown"),
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            "completion received"
        );
        Ok(completion.text.unwrap_or_default())
    }

    fn model_id(&self) -> &str {
        &self.model_spec
    }
}
