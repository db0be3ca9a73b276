//! Generator backed by a chat-completion provider.

use socratic_providers::retry::RetryConfig;
use socratic_providers::{ApiConfig, GenerateRequest, generate};
use tracing::debug;

use crate::capabilities::{CapabilityFut, GenerationError, Generator};
use crate::config::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

#[derive(Debug, Clone)]
pub struct ProviderGenerator {
    config: ApiConfig,
    retry: RetryConfig,
    max_tokens: u32,
    temperature: f32,
}

impl ProviderGenerator {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            retry: RetryConfig::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn api_config(&self) -> &ApiConfig {
        &self.config
    }
}

impl Generator for ProviderGenerator {
    fn generate<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
    ) -> CapabilityFut<'a, Result<String, GenerationError>> {
        Box::pin(async move {
            let request = GenerateRequest {
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                ..GenerateRequest::new(system, user)
            };
            let text = generate(&self.config, &request, &self.retry)
                .await
                .inspect_err(|e| {
                    debug!(transient = e.is_transient(), error = %e, "Provider call failed");
                })?;
            if text.trim().is_empty() {
                return Err(GenerationError::Empty);
            }
            Ok(text)
        })
    }
}
