use serde::Deserialize;
use std::{env, fmt, path::Path, path::PathBuf};

use socratic_retrieval::Bm25Params;
use socratic_types::{ApiKey, Provider};
use socratic_webfetch::WebFetchConfig;
use thiserror::Error;

pub const DEFAULT_TAU: f64 = 0.65;
pub const DEFAULT_TOP_K: usize = 4;
pub const DEFAULT_MAX_TOKENS: u32 = 128;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Sources ingested when a lesson starts with `RAG: <topic>` and names no URLs.
pub const DEFAULT_RAG_URLS: [&str; 2] = [
    "https://en.wikipedia.org/wiki/Retrieval-augmented_generation",
    "https://fastapi.tiangolo.com/",
];

#[derive(Debug, Default, Deserialize)]
pub struct SocraticConfig {
    pub app: Option<AppConfig>,
    pub api_keys: Option<ApiKeys>,
    pub policy: Option<PolicyConfig>,
    pub retrieval: Option<RetrievalConfig>,
    /// Fetch and chunking settings for lesson sources.
    pub webfetch: Option<WebFetchConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// "huggingface" (default), "openai", or "claude".
    pub provider: Option<String>,
    pub model: Option<String>,
    /// Answer from fixed templates only; never call a generation provider.
    #[serde(default)]
    pub offline: bool,
}

#[derive(Default, Deserialize)]
pub struct ApiKeys {
    pub anthropic: Option<String>,
    pub openai: Option<String>,
    pub huggingface: Option<String>,
}

// Manual Debug impl to prevent leaking API keys in logs.
impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(opt: Option<&String>) -> &'static str {
            if opt.is_some() { "[REDACTED]" } else { "None" }
        }
        f.debug_struct("ApiKeys")
            .field("anthropic", &mask(self.anthropic.as_ref()))
            .field("openai", &mask(self.openai.as_ref()))
            .field("huggingface", &mask(self.huggingface.as_ref()))
            .finish()
    }
}

impl ApiKeys {
    fn raw(&self, provider: Provider) -> Option<&String> {
        match provider {
            Provider::Claude => self.anthropic.as_ref(),
            Provider::OpenAI => self.openai.as_ref(),
            Provider::HuggingFace => self.huggingface.as_ref(),
        }
    }
}

/// Dialogue policy thresholds and generation parameters.
///
/// ```toml
/// [policy]
/// tau = 0.65
/// max_tokens = 128
/// temperature = 0.2
/// ```
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PolicyConfig {
    /// Readiness needed before a verified claim may finish the conversation.
    pub tau: Option<f64>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl PolicyConfig {
    #[must_use]
    pub fn tau(&self) -> f64 {
        self.tau
            .filter(|tau| tau.is_finite())
            .map_or(DEFAULT_TAU, |tau| tau.clamp(0.0, 1.0))
    }

    #[must_use]
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    #[must_use]
    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

/// BM25 parameters and lesson defaults.
///
/// ```toml
/// [retrieval]
/// k1 = 1.5
/// b = 0.75
/// top_k = 4
/// default_urls = ["https://en.wikipedia.org/wiki/Retrieval-augmented_generation"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrievalConfig {
    pub k1: Option<f64>,
    pub b: Option<f64>,
    pub top_k: Option<usize>,
    pub default_urls: Option<Vec<String>>,
}

impl RetrievalConfig {
    #[must_use]
    pub fn bm25_params(&self) -> Bm25Params {
        let defaults = Bm25Params::default();
        Bm25Params {
            k1: self.k1.unwrap_or(defaults.k1),
            b: self.b.unwrap_or(defaults.b),
        }
    }

    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k.filter(|k| *k > 0).unwrap_or(DEFAULT_TOP_K)
    }

    #[must_use]
    pub fn default_urls(&self) -> Vec<String> {
        match &self.default_urls {
            Some(urls) => urls.iter().map(|url| expand_env_vars(url)).collect(),
            None => DEFAULT_RAG_URLS.iter().map(ToString::to_string).collect(),
        }
    }
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unclosed reference: keep the remainder verbatim.
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

impl SocraticConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        Self::load_from(&path)
    }

    /// Load from `path` if it exists. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        Self::read(path).map(Some)
    }

    /// Load a file the user named explicitly; a missing file is a read error.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn offline(&self) -> bool {
        self.app.as_ref().is_some_and(|app| app.offline)
    }

    /// Configured provider; unknown names fall back to the default with a warning.
    #[must_use]
    pub fn provider(&self) -> Provider {
        let raw = self.app.as_ref().and_then(|app| app.provider.as_deref());
        match raw {
            None => Provider::default(),
            Some(name) => Provider::parse(name).unwrap_or_else(|| {
                tracing::warn!(provider = name, "Unknown provider in config, using default");
                Provider::default()
            }),
        }
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.app
            .as_ref()
            .and_then(|app| app.model.as_deref())
            .map(str::trim)
            .filter(|model| !model.is_empty())
    }

    /// API key for `provider`: config value (with `${VAR}` expansion) first,
    /// then the provider's environment variable.
    #[must_use]
    pub fn api_key(&self, provider: Provider) -> Option<ApiKey> {
        let configured = self
            .api_keys
            .as_ref()
            .and_then(|keys| keys.raw(provider))
            .map(|raw| expand_env_vars(raw).trim().to_string())
            .filter(|key| !key.is_empty());

        let key = configured.or_else(|| {
            env::var(provider.env_var())
                .ok()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
        })?;
        Some(ApiKey::new(provider, key))
    }

    #[must_use]
    pub fn policy(&self) -> PolicyConfig {
        self.policy.unwrap_or_default()
    }

    #[must_use]
    pub fn retrieval(&self) -> RetrievalConfig {
        self.retrieval.clone().unwrap_or_default()
    }

    #[must_use]
    pub fn webfetch(&self) -> WebFetchConfig {
        self.webfetch.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".socratic").join("config.toml"))
}
