//! Non-streaming text generation clients.
//!
//! - [`generate`] - unified entry point that dispatches on the configured provider
//! - [`openai`] - OpenAI-compatible Chat Completions (OpenAI and the Hugging Face router)
//! - [`claude`] - Anthropic Messages API
//!
//! Every call is one system instruction plus one user message and returns the
//! first text block of the reply. Transient failures are retried per
//! [`retry::RetryConfig`]; everything else surfaces as [`ProviderError`].

pub mod claude;
pub mod openai;
pub mod retry;

use std::time::Duration;

use socratic_types::{ApiKey, ModelName, Provider};
use thiserror::Error;

pub use socratic_types;

/// Canonical Anthropic Messages API endpoint.
pub const CLAUDE_MESSAGES_API_URL: &str = "https://api.anthropic.com/v1/messages";
/// Canonical OpenAI Chat Completions endpoint.
pub const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Hugging Face inference router, OpenAI-compatible.
pub const HUGGINGFACE_ROUTER_URL: &str = "https://router.huggingface.co/v1/chat/completions";

const CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

pub fn http_client_with_timeout(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(timeout_secs))
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key provider {key:?} does not match model provider {model:?}")]
    ProviderMismatch { key: Provider, model: Provider },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: Provider,
        status: u16,
        body: String,
    },
    #[error("connection error after {attempts} attempts: {source}")]
    Connection {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("request error: {0}")]
    Request(#[source] reqwest::Error),
    #[error("unexpected {provider} response: {detail}")]
    MalformedResponse { provider: Provider, detail: String },
}

impl ProviderError {
    /// Whether a later attempt could plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Api { status, .. } => {
                matches!(status, 408 | 409 | 429) || (500..600).contains(status)
            }
            ProviderError::Connection { .. } => true,
            _ => false,
        }
    }
}

/// Provider + model configuration.
///
/// The constructor enforces that the API key and model belong to the same provider.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    api_key: ApiKey,
    model: ModelName,
    endpoint: Option<String>,
    timeout_secs: u64,
}

impl ApiConfig {
    pub fn new(api_key: ApiKey, model: ModelName) -> Result<Self, ProviderError> {
        let key_provider = api_key.provider();
        let model_provider = model.provider();
        if key_provider != model_provider {
            return Err(ProviderError::ProviderMismatch {
                key: key_provider,
                model: model_provider,
            });
        }

        Ok(Self {
            api_key,
            model,
            endpoint: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        })
    }

    /// Override the endpoint URL (proxies, local servers, tests).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    #[must_use]
    pub fn provider(&self) -> Provider {
        self.api_key.provider()
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    #[must_use]
    pub fn model(&self) -> &ModelName {
        &self.model
    }

    #[must_use]
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        if let Some(endpoint) = &self.endpoint {
            return endpoint;
        }
        match self.provider() {
            Provider::Claude => CLAUDE_MESSAGES_API_URL,
            Provider::OpenAI => OPENAI_CHAT_COMPLETIONS_URL,
            Provider::HuggingFace => HUGGINGFACE_ROUTER_URL,
        }
    }
}

/// One generation call: a system instruction and a single user turn.
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl<'a> GenerateRequest<'a> {
    pub const DEFAULT_MAX_TOKENS: u32 = 128;
    pub const DEFAULT_TEMPERATURE: f32 = 0.2;

    #[must_use]
    pub fn new(system: &'a str, user: &'a str) -> Self {
        Self {
            system,
            user,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: Self::DEFAULT_TEMPERATURE,
        }
    }
}

/// Generate a reply with the configured provider.
pub async fn generate(
    config: &ApiConfig,
    request: &GenerateRequest<'_>,
    retry_config: &retry::RetryConfig,
) -> Result<String, ProviderError> {
    match config.provider() {
        Provider::Claude => claude::generate(config, request, retry_config).await,
        Provider::OpenAI | Provider::HuggingFace => {
            openai::generate(config, request, retry_config).await
        }
    }
}

/// Turn a retry outcome into the successful response body as JSON.
pub(crate) async fn into_json(
    provider: Provider,
    outcome: retry::RetryOutcome,
) -> Result<serde_json::Value, ProviderError> {
    let response = match outcome {
        retry::RetryOutcome::Success(response) => response,
        retry::RetryOutcome::HttpError(response) => {
            let status = response.status().as_u16();
            let body = read_capped_error_body(response).await;
            tracing::warn!(provider = provider.as_str(), status, "Generation request failed");
            return Err(ProviderError::Api {
                provider,
                status,
                body,
            });
        }
        retry::RetryOutcome::ConnectionError { attempts, source } => {
            return Err(ProviderError::Connection { attempts, source });
        }
        retry::RetryOutcome::NonRetryable(e) => return Err(ProviderError::Request(e)),
    };

    response
        .json::<serde_json::Value>()
        .await
        .map_err(|e| ProviderError::MalformedResponse {
            provider,
            detail: format!("body is not JSON: {e}"),
        })
}

async fn read_capped_error_body(response: reqwest::Response) -> String {
    let mut text = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read error: {e}>"));
    if text.len() > MAX_ERROR_BODY_BYTES {
        let mut cut = MAX_ERROR_BODY_BYTES;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("...");
    }
    text
}
