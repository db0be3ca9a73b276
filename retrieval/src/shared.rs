use std::sync::{Arc, RwLock};

use tracing::info;

use crate::index::{Bm25Index, Bm25Params, DocumentMeta, IndexError, SearchHit};

/// Cloneable handle to one index shared across conversations.
///
/// A batch is appended and its statistics recomputed under a single write
/// guard, so readers never see a half-ingested batch.
#[derive(Debug, Clone, Default)]
pub struct SharedIndex {
    inner: Arc<RwLock<Bm25Index>>,
}

impl SharedIndex {
    #[must_use]
    pub fn new(params: Bm25Params) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Bm25Index::with_params(params))),
        }
    }

    pub fn add_documents(
        &self,
        chunks: Vec<String>,
        metas: Vec<DocumentMeta>,
    ) -> Result<usize, IndexError> {
        let mut index = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let added = index.add_documents(chunks, metas)?;
        info!(added, total = index.len(), "Indexed chunks");
        Ok(added)
    }

    #[must_use]
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .search(query, top_k)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
