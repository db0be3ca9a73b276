use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::tokenize::tokenize;

const DENOM_FLOOR: f64 = 1e-9;

/// BM25 tuning constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// Where a chunk came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub source_url: String,
    pub chunk_index: usize,
}

impl DocumentMeta {
    #[must_use]
    pub fn new(source_url: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            source_url: source_url.into(),
            chunk_index,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("chunk/metadata length mismatch: {chunks} chunks, {metas} metadata entries")]
    LengthMismatch { chunks: usize, metas: usize },
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub score: f64,
    pub text: String,
    pub meta: DocumentMeta,
}

#[derive(Debug, Clone)]
struct Document {
    term_counts: HashMap<String, u32>,
    len: usize,
    text: String,
    meta: DocumentMeta,
}

/// In-memory BM25 index.
#[derive(Debug, Clone, Default)]
pub struct Bm25Index {
    params: Bm25Params,
    docs: Vec<Document>,
    doc_freq: HashMap<String, usize>,
    avg_doc_len: f64,
    keys: HashSet<DocumentMeta>,
}

impl Bm25Index {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_params(params: Bm25Params) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn params(&self) -> Bm25Params {
        self.params
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    #[must_use]
    pub fn avg_doc_len(&self) -> f64 {
        self.avg_doc_len
    }

    #[must_use]
    pub fn doc_freq(&self, term: &str) -> usize {
        self.doc_freq.get(term).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn contains(&self, meta: &DocumentMeta) -> bool {
        self.keys.contains(meta)
    }

    /// Append a batch of chunks with parallel metadata.
    ///
    /// Chunks whose `(source_url, chunk_index)` is already indexed are
    /// skipped. Returns the number of documents actually added. A length
    /// mismatch is rejected before anything is touched.
    pub fn add_documents(
        &mut self,
        chunks: Vec<String>,
        metas: Vec<DocumentMeta>,
    ) -> Result<usize, IndexError> {
        if chunks.len() != metas.len() {
            return Err(IndexError::LengthMismatch {
                chunks: chunks.len(),
                metas: metas.len(),
            });
        }

        let mut added = 0;
        for (text, meta) in chunks.into_iter().zip(metas) {
            if self.keys.contains(&meta) {
                debug!(
                    url = %meta.source_url,
                    chunk = meta.chunk_index,
                    "Skipping already indexed chunk"
                );
                continue;
            }

            let tokens = tokenize(&text);
            let mut term_counts: HashMap<String, u32> = HashMap::new();
            for token in &tokens {
                *term_counts.entry(token.clone()).or_insert(0) += 1;
            }
            for term in term_counts.keys() {
                *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
            }

            self.keys.insert(meta.clone());
            self.docs.push(Document {
                term_counts,
                len: tokens.len(),
                text,
                meta,
            });
            added += 1;
        }

        if added > 0 {
            let total: usize = self.docs.iter().map(|doc| doc.len).sum();
            self.avg_doc_len = total as f64 / self.docs.len().max(1) as f64;
        }

        Ok(added)
    }

    fn idf(&self, term: &str) -> f64 {
        let n = self.docs.len() as f64;
        let df = self.doc_freq(term) as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn score(&self, query_tokens: &[String], doc: &Document) -> f64 {
        let Bm25Params { k1, b } = self.params;
        let length_ratio = doc.len as f64 / self.avg_doc_len.max(DENOM_FLOOR);

        query_tokens
            .iter()
            .filter_map(|term| {
                let f = f64::from(*doc.term_counts.get(term)?);
                let denom = f + k1 * (1.0 - b + b * length_ratio);
                Some(self.idf(term) * (f * (k1 + 1.0)) / denom.max(DENOM_FLOOR))
            })
            // Start from +0.0 so unmatched documents never render as "-0.000".
            .fold(0.0, |acc, term_score| acc + term_score)
    }

    /// Rank every document against `query` and keep the best `top_k`.
    ///
    /// Ordering is descending by score; equal scores keep insertion order.
    #[must_use]
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        if self.docs.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let query_tokens = tokenize(query);
        let mut scored: Vec<(f64, &Document)> = self
            .docs
            .iter()
            .map(|doc| (self.score(&query_tokens, doc), doc))
            .collect();

        // sort_by is stable, so ties stay in insertion order.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(score, doc)| SearchHit {
                score,
                text: doc.text.clone(),
                meta: doc.meta.clone(),
            })
            .collect()
    }
}
