//! Generation providers, provider-scoped model names, and API keys.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

/// Chat-completion backends the tutor can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Provider {
    /// Hugging Face inference router (OpenAI-compatible wire format).
    #[default]
    HuggingFace,
    OpenAI,
    Claude,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::HuggingFace, Provider::OpenAI, Provider::Claude];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Provider::HuggingFace => "huggingface",
            Provider::OpenAI => "openai",
            Provider::Claude => "claude",
        }
    }

    /// Environment variable consulted when the config has no key.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Provider::HuggingFace => "HF_TOKEN",
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Claude => "ANTHROPIC_API_KEY",
        }
    }

    #[must_use]
    pub const fn default_model(self) -> ModelName {
        let name = match self {
            Provider::HuggingFace => "Qwen/Qwen2.5-7B-Instruct",
            Provider::OpenAI => "gpt-4o-mini",
            Provider::Claude => "claude-haiku-4-5-20251001",
        };
        ModelName::known(self, name)
    }

    /// Case-insensitive, with common aliases (`hf`, `gpt`, `anthropic`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let name = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|provider| provider.as_str() == name).or(
            match name.as_str() {
                "hf" | "hugging-face" => Some(Provider::HuggingFace),
                "gpt" | "chatgpt" => Some(Provider::OpenAI),
                "anthropic" => Some(Provider::Claude),
                _ => None,
            },
        )
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ModelParseError {
    #[error("model name cannot be empty")]
    Empty,
    #[error("Claude model must start with claude- (got {0})")]
    ClaudePrefix(String),
}

/// Model name tied to the provider that serves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelName {
    provider: Provider,
    name: Cow<'static, str>,
}

impl ModelName {
    pub fn parse(provider: Provider, raw: &str) -> Result<Self, ModelParseError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ModelParseError::Empty);
        }
        if provider == Provider::Claude && !name.to_ascii_lowercase().starts_with("claude-") {
            return Err(ModelParseError::ClaudePrefix(name.to_string()));
        }
        Ok(Self {
            provider,
            name: Cow::Owned(name.to_string()),
        })
    }

    #[must_use]
    pub const fn known(provider: Provider, name: &'static str) -> Self {
        Self {
            provider,
            name: Cow::Borrowed(name),
        }
    }

    #[must_use]
    pub const fn provider(&self) -> Provider {
        self.provider
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Secret for one provider. `Debug` never prints the value.
#[derive(Clone)]
pub struct ApiKey {
    provider: Provider,
    secret: String,
}

impl ApiKey {
    #[must_use]
    pub fn new(provider: Provider, secret: impl Into<String>) -> Self {
        Self {
            provider,
            secret: secret.into(),
        }
    }

    #[must_use]
    pub const fn provider(&self) -> Provider {
        self.provider
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("provider", &self.provider)
            .field("secret", &"<redacted>")
            .finish()
    }
}
