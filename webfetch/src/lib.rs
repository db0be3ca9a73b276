//! URL fetching and chunking for lexical retrieval.
//!
//! # Pipeline
//!
//! 1. **Validation** - the URL must parse and use http or https
//! 2. **Fetch** - GET with HTML `Accept` headers, bounded redirects, timeout,
//!    and a capped body; a blocked Wikipedia article is retried through the
//!    REST endpoint of the same host
//! 3. **Extraction** - `<script>`, `<style>`, `<noscript>` dropped, whitespace collapsed
//! 4. **Chunking** - overlapping word windows with stable indices
//!
//! All errors are [`WebFetchError`] with a stable [`ErrorCode`] and a
//! `retryable` hint.

mod chunk;
mod extract;
mod http;
mod types;

use tracing::info;

pub use chunk::ChunkPolicy;
pub use extract::{ExtractedText, extract_html, extract_plain};
pub use http::wikipedia_rest_url;
pub use types::{ErrorCode, FetchChunk, FetchedDocument, WebFetchConfig, WebFetchError};

/// Reusable fetcher holding one HTTP client and the chunk policy.
#[derive(Debug, Clone)]
pub struct WebFetcher {
    client: reqwest::Client,
    config: WebFetchConfig,
    policy: ChunkPolicy,
}

impl WebFetcher {
    pub fn new(config: WebFetchConfig) -> Result<Self, WebFetchError> {
        let policy = ChunkPolicy::new(config.chunk_words(), config.chunk_overlap())?;
        let client = http::build_client(&config)?;
        Ok(Self {
            client,
            config,
            policy,
        })
    }

    #[must_use]
    pub fn policy(&self) -> ChunkPolicy {
        self.policy
    }

    /// Fetch a URL and return its cleaned text as chunks.
    ///
    /// # Errors
    ///
    /// Returns `WebFetchError` for invalid URLs or schemes, network and
    /// timeout failures, non-success statuses, oversized bodies, and
    /// unsupported content types.
    pub async fn fetch(&self, url: &str) -> Result<FetchedDocument, WebFetchError> {
        let parsed = http::parse_url(url)?;
        let page = http::fetch(&self.client, &parsed, &self.config).await?;

        let extracted = if page.is_html {
            extract_html(&page.body)
        } else {
            extract_plain(&page.body)
        };
        let chunks = self.policy.chunk(&extracted.text);

        info!(
            url,
            final_url = %page.final_url,
            chunks = chunks.len(),
            fallback = page.used_fallback,
            "Fetched page"
        );

        Ok(FetchedDocument {
            requested_url: url.to_string(),
            final_url: page.final_url.to_string(),
            title: extracted.title,
            used_fallback: page.used_fallback,
            chunks,
        })
    }
}
