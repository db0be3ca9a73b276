//! BM25 retrieval index.
//!
//! The index owns a growable corpus of text chunks tagged with their source
//! URL and chunk position. Documents are immutable once added and corpus
//! statistics only ever grow. [`SharedIndex`] wraps the index behind a
//! single-writer/multi-reader lock so one corpus can serve several
//! conversations.

mod index;
mod shared;
mod tokenize;

pub use index::{Bm25Index, Bm25Params, DocumentMeta, IndexError, SearchHit};
pub use shared::SharedIndex;
pub use tokenize::tokenize;
