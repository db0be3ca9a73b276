//! Configuration, output, and error types for page fetching.

use serde::Deserialize;
use thiserror::Error;

/// `[webfetch]` section of config.toml. Unset fields use the defaults below.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WebFetchConfig {
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u32>,
    pub max_redirects: Option<u32>,
    pub max_download_bytes: Option<u64>,
    /// Words per chunk.
    pub chunk_words: Option<usize>,
    /// Words shared by consecutive chunks; must be below `chunk_words`.
    pub chunk_overlap: Option<usize>,
}

impl WebFetchConfig {
    pub const DEFAULT_USER_AGENT: &'static str = concat!("socratic/", env!("CARGO_PKG_VERSION"));
    pub const DEFAULT_TIMEOUT_SECONDS: u32 = 20;
    pub const DEFAULT_MAX_REDIRECTS: u32 = 10;
    pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 5_000_000;
    pub const DEFAULT_CHUNK_WORDS: usize = 180;
    pub const DEFAULT_CHUNK_OVERLAP: usize = 30;

    #[must_use]
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(Self::DEFAULT_USER_AGENT)
    }

    #[must_use]
    pub fn timeout_seconds(&self) -> u32 {
        self.timeout_seconds.unwrap_or(Self::DEFAULT_TIMEOUT_SECONDS)
    }

    #[must_use]
    pub fn max_redirects(&self) -> u32 {
        self.max_redirects.unwrap_or(Self::DEFAULT_MAX_REDIRECTS)
    }

    #[must_use]
    pub fn max_download_bytes(&self) -> u64 {
        self.max_download_bytes.unwrap_or(Self::DEFAULT_MAX_DOWNLOAD_BYTES)
    }

    #[must_use]
    pub fn chunk_words(&self) -> usize {
        self.chunk_words.unwrap_or(Self::DEFAULT_CHUNK_WORDS)
    }

    #[must_use]
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap.unwrap_or(Self::DEFAULT_CHUNK_OVERLAP)
    }
}

/// Cleaned page split into word windows.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// URL as the caller gave it; chunks are keyed on this.
    pub requested_url: String,
    /// URL that served the content, without fragment.
    pub final_url: String,
    pub title: Option<String>,
    /// Content came from the Wikipedia REST endpoint.
    pub used_fallback: bool,
    pub chunks: Vec<FetchChunk>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchChunk {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    BadArgs,
    InvalidUrl,
    InvalidScheme,
    RedirectLimit,
    Timeout,
    Network,
    ResponseTooLarge,
    UnsupportedContentType,
    Http4xx,
    Http5xx,
    ExtractionFailed,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadArgs => "bad_args",
            ErrorCode::InvalidUrl => "invalid_url",
            ErrorCode::InvalidScheme => "invalid_scheme",
            ErrorCode::RedirectLimit => "redirect_limit",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Network => "network",
            ErrorCode::ResponseTooLarge => "response_too_large",
            ErrorCode::UnsupportedContentType => "unsupported_content_type",
            ErrorCode::Http4xx => "http_4xx",
            ErrorCode::Http5xx => "http_5xx",
            ErrorCode::ExtractionFailed => "extraction_failed",
        }
    }
}

/// Fetch failure. `code` is stable for matching; `message` is what the
/// ingestion report shows.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct WebFetchError {
    pub code: ErrorCode,
    pub message: String,
    /// Another attempt may succeed.
    pub retryable: bool,
    details: Vec<(String, String)>,
}

impl WebFetchError {
    pub fn new(code: ErrorCode, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            code,
            message: message.into(),
            retryable,
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v.as_str()))
    }

    pub fn details(&self) -> impl Iterator<Item = (&str, &str)> {
        self.details.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
