//! Placement Insights retrieval adapter.
//!
//! Supplies historical context to the trend comparison stage:
//!
//! - [`FileHistoricalSource`] implements [`pipeline::HistoricalSource`] over a
//!   local text file. A missing file is a normal condition (`Ok(None)`).
//! - [`ChunkConfig`] splits a corpus into overlapping, fixed-size chunks.
//! - [`VectorIndex`] embeds the chunks with any [`pipeline::Embedder`] and
//!   answers top-k cosine-similarity queries.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** The index is built from scratch for every request and
//! never cached or persisted; the corpus is small and static.

mod chunk;
mod index;
mod source;

pub use chunk::ChunkConfig;
pub use index::VectorIndex;
pub use source::FileHistoricalSource;

use pipeline::LlmError;
use thiserror::Error;

/// Failures while chunking, embedding, or querying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetrievalError {
    /// Chunk overlap must be smaller than the chunk size.
    #[error("invalid chunk configuration: size {size}, overlap {overlap}")]
    InvalidChunkConfig { size: usize, overlap: usize },

    /// The embedding model call failed.
    #[error("embedding failed: {0}")]
    Embedding(#[from] LlmError),

    /// The embedder returned a different number of vectors than inputs.
    #[error("embedder returned {received} vectors for {expected} inputs")]
    EmbeddingMismatch { expected: usize, received: usize },
}
