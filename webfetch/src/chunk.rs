//! Sliding word-window chunking.

use crate::types::{ErrorCode, FetchChunk, WebFetchError};

/// Window size and overlap, in whitespace-separated words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    words: usize,
    overlap: usize,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            words: 180,
            overlap: 30,
        }
    }
}

impl ChunkPolicy {
    /// The overlap must be strictly smaller than the window.
    pub fn new(words: usize, overlap: usize) -> Result<Self, WebFetchError> {
        if words == 0 || overlap >= words {
            return Err(WebFetchError::new(
                ErrorCode::BadArgs,
                format!("chunk overlap ({overlap}) must be smaller than chunk size ({words})"),
                false,
            )
            .with_detail("chunk_words", words.to_string())
            .with_detail("chunk_overlap", overlap.to_string()));
        }
        Ok(Self { words, overlap })
    }

    #[must_use]
    pub fn words(&self) -> usize {
        self.words
    }

    #[must_use]
    pub fn stride(&self) -> usize {
        self.words - self.overlap
    }

    /// Split `text` into overlapping windows. The last partial window is kept.
    #[must_use]
    pub fn chunk(&self, text: &str) -> Vec<FetchChunk> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + self.words).min(words.len());
            chunks.push(FetchChunk {
                index: chunks.len(),
                text: words[start..end].join(" "),
            });
            start += self.stride();
        }
        chunks
    }
}
