//! Wiring from configuration to a ready orchestrator.

use std::sync::Arc;

use socratic_providers::{ApiConfig, ProviderError};
use socratic_retrieval::SharedIndex;
use socratic_tools::CheckNumericClaim;
use socratic_types::{ModelName, ModelParseError};
use socratic_webfetch::{WebFetchError, WebFetcher};
use thiserror::Error;
use tracing::{info, warn};

use crate::capabilities::{Capabilities, CapabilityError};
use crate::config::SocraticConfig;
use crate::generation::ProviderGenerator;
use crate::orchestrator::Orchestrator;
use crate::policy::PolicySettings;
use crate::service::{RagService, WebContentSource};

#[derive(Debug, Error)]
pub enum InitError {
    #[error("invalid webfetch configuration: {0}")]
    WebFetch(#[from] WebFetchError),
    #[error("invalid model name: {0}")]
    Model(#[from] ModelParseError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

/// Generator for the configured provider, or `None` when offline or no key is available.
pub fn generator_from_config(
    config: &SocraticConfig,
) -> Result<Option<ProviderGenerator>, InitError> {
    if config.offline() {
        info!("Offline mode: using fixed templates");
        return Ok(None);
    }

    let provider = config.provider();
    let Some(api_key) = config.api_key(provider) else {
        warn!(
            provider = provider.as_str(),
            env_var = provider.env_var(),
            "No API key configured, using fixed templates"
        );
        return Ok(None);
    };

    let model = match config.model() {
        Some(raw) => ModelName::parse(provider, raw)?,
        None => provider.default_model(),
    };
    let policy = config.policy();
    let api_config = ApiConfig::new(api_key, model)?;
    info!(
        provider = provider.as_str(),
        model = api_config.model().as_str(),
        "Generation enabled"
    );

    Ok(Some(
        ProviderGenerator::new(api_config).with_sampling(policy.max_tokens(), policy.temperature()),
    ))
}

/// Verifier, generator, and web-backed retriever over `index`.
pub fn capabilities_from_config(
    config: &SocraticConfig,
    index: SharedIndex,
) -> Result<Capabilities, InitError> {
    let fetcher = WebFetcher::new(config.webfetch())?;
    let service = RagService::new(index, Arc::new(WebContentSource::new(fetcher)));

    let mut builder = Capabilities::builder()
        .verifier(Arc::new(CheckNumericClaim::new()))
        .retriever(Arc::new(service));
    if let Some(generator) = generator_from_config(config)? {
        builder = builder.generator(Arc::new(generator));
    }
    Ok(builder.build()?)
}

/// A fresh conversation wired per `config`.
pub fn orchestrator_from_config(
    config: &SocraticConfig,
    index: SharedIndex,
) -> Result<Orchestrator, InitError> {
    let capabilities = capabilities_from_config(config, index)?;
    Ok(Orchestrator::new(
        capabilities,
        PolicySettings::from_config(config),
    ))
}

#[cfg(test)]
mod tests {
    use socratic_retrieval::SharedIndex;

    use super::{InitError, capabilities_from_config, generator_from_config};
    use crate::config::SocraticConfig;

    #[test]
    fn offline_has_no_generator() {
        let config: SocraticConfig = toml::from_str("[app]\noffline = true\n").unwrap();
        assert!(generator_from_config(&config).unwrap().is_none());

        let caps = capabilities_from_config(&config, SharedIndex::default()).unwrap();
        assert!(caps.generator().is_none());
        assert!(caps.retriever().is_some());
    }

    #[test]
    fn configured_key_enables_generation() {
        let config: SocraticConfig = toml::from_str(
            "[app]\nprovider = \"openai\"\nmodel = \"gpt-4o-mini\"\n[api_keys]\nopenai = \"sk-test\"\n",
        )
        .unwrap();
        let generator = generator_from_config(&config).unwrap().unwrap();
        assert_eq!(generator.api_config().model().as_str(), "gpt-4o-mini");
    }

    #[test]
    fn claude_model_must_be_claude() {
        let config: SocraticConfig = toml::from_str(
            "[app]\nprovider = \"claude\"\nmodel = \"gpt-4o\"\n[api_keys]\nanthropic = \"sk-ant\"\n",
        )
        .unwrap();
        assert!(matches!(
            generator_from_config(&config),
            Err(InitError::Model(_))
        ));
    }

    #[test]
    fn bad_chunking_is_rejected() {
        let config: SocraticConfig = toml::from_str(
            "[app]\noffline = true\n[webfetch]\nchunk_words = 10\nchunk_overlap = 10\n",
        )
        .unwrap();
        assert!(matches!(
            capabilities_from_config(&config, SharedIndex::default()),
            Err(InitError::WebFetch(_))
        ));
    }
}
