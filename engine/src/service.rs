//! Retrieval service: ingestion and context queries over a shared index.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use socratic_retrieval::{DocumentMeta, SharedIndex};
use socratic_webfetch::{WebFetchError, WebFetcher};
use tracing::{debug, info, warn};

use crate::capabilities::{CapabilityFut, Retriever};

pub const NO_CONTEXT: &str = "No context available yet; add URLs or content first.";
pub const EMPTY_QUESTION: &str = "Please provide a 'question' string.";

const SNIPPET_CHARS: usize = 220;

/// Source of chunked text for a URL.
pub trait ContentSource: Send + Sync {
    fn chunks<'a>(&'a self, url: &'a str) -> CapabilityFut<'a, Result<Vec<String>, WebFetchError>>;
}

/// Fetches pages over HTTP and chunks their cleaned text.
#[derive(Debug, Clone)]
pub struct WebContentSource {
    fetcher: WebFetcher,
}

impl WebContentSource {
    #[must_use]
    pub fn new(fetcher: WebFetcher) -> Self {
        Self { fetcher }
    }
}

impl ContentSource for WebContentSource {
    fn chunks<'a>(&'a self, url: &'a str) -> CapabilityFut<'a, Result<Vec<String>, WebFetchError>> {
        Box::pin(async move {
            let document = self.fetcher.fetch(url).await?;
            debug!(
                url,
                final_url = document.final_url.as_str(),
                title = document.title.as_deref().unwrap_or(""),
                "Source fetched"
            );
            Ok(document.chunks.into_iter().map(|chunk| chunk.text).collect())
        })
    }
}

/// Result of ingesting one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestStatus {
    /// Newly indexed chunks; zero for a URL ingested before.
    Chunks(usize),
    Failed(String),
}

impl fmt::Display for IngestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestStatus::Chunks(count) => write!(f, "{count}"),
            IngestStatus::Failed(message) => write!(f, "error: {message}"),
        }
    }
}

/// Per-URL ingestion results in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    entries: Vec<(String, IngestStatus)>,
}

impl IngestReport {
    pub fn push(&mut self, url: impl Into<String>, status: IngestStatus) {
        self.entries.push((url.into(), status));
    }

    #[must_use]
    pub fn entries(&self) -> &[(String, IngestStatus)] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, url: &str) -> Option<&IngestStatus> {
        self.entries
            .iter()
            .rev()
            .find(|(entry, _)| entry == url)
            .map(|(_, status)| status)
    }

    #[must_use]
    pub fn total_chunks(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, status)| match status {
                IngestStatus::Chunks(count) => *count,
                IngestStatus::Failed(_) => 0,
            })
            .sum()
    }

    #[must_use]
    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, status)| matches!(status, IngestStatus::Failed(_)))
            .count()
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (url, status)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{url}: {status}")?;
        }
        Ok(())
    }
}

/// Ingestion plus BM25 context queries.
///
/// The index handle may be shared with other services; the set of
/// ingested URLs belongs to this service.
pub struct RagService {
    index: SharedIndex,
    source: Arc<dyn ContentSource>,
    seen: Mutex<HashSet<String>>,
}

impl fmt::Debug for RagService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RagService")
            .field("documents", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl RagService {
    #[must_use]
    pub fn new(index: SharedIndex, source: Arc<dyn ContentSource>) -> Self {
        Self {
            index,
            source,
            seen: Mutex::new(HashSet::new()),
        }
    }

    #[must_use]
    pub fn index(&self) -> &SharedIndex {
        &self.index
    }

    fn is_seen(&self, url: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }

    fn mark_seen(&self, url: &str) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string());
    }

    /// Fetch, chunk, and index each URL. Known URLs report zero chunks;
    /// a failing URL is reported and the rest still run.
    pub async fn ingest(&self, urls: &[String]) -> IngestReport {
        let mut report = IngestReport::default();
        for url in urls {
            if self.is_seen(url) {
                report.push(url.clone(), IngestStatus::Chunks(0));
                continue;
            }

            let status = match self.source.chunks(url).await {
                Ok(chunks) => {
                    let metas = (0..chunks.len())
                        .map(|i| DocumentMeta::new(url.clone(), i))
                        .collect();
                    match self.index.add_documents(chunks, metas) {
                        Ok(added) => {
                            self.mark_seen(url);
                            IngestStatus::Chunks(added)
                        }
                        Err(e) => IngestStatus::Failed(e.to_string()),
                    }
                }
                Err(e) => {
                    warn!(url = url.as_str(), code = e.code.as_str(), error = %e, "Ingestion failed");
                    IngestStatus::Failed(e.to_string())
                }
            };
            report.push(url.clone(), status);
        }

        info!(
            urls = urls.len(),
            chunks = report.total_chunks(),
            failures = report.failures(),
            documents = self.index.len(),
            "Ingestion finished"
        );
        report
    }

    /// Top passages for `question`, one line per hit with score and source.
    #[must_use]
    pub fn ask(&self, question: &str, top_k: usize) -> String {
        let question = question.trim();
        if question.is_empty() {
            return EMPTY_QUESTION.to_string();
        }

        let hits = self.index.search(question, top_k);
        if hits.is_empty() {
            return NO_CONTEXT.to_string();
        }

        let lines: Vec<String> = hits
            .iter()
            .map(|hit| {
                format!(
                    "- score={:.3} | {} (source: {})",
                    hit.score,
                    snippet(&hit.text),
                    hit.meta.source_url
                )
            })
            .collect();
        format!("Top passages for: {question}\n{}", lines.join("\n"))
    }
}

fn snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

impl Retriever for RagService {
    fn ingest<'a>(&'a self, urls: &'a [String]) -> CapabilityFut<'a, IngestReport> {
        Box::pin(RagService::ingest(self, urls))
    }

    fn ask(&self, question: &str, top_k: usize) -> String {
        RagService::ask(self, question, top_k)
    }
}
