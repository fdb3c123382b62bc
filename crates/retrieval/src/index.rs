//! In-memory cosine-similarity index over corpus chunks.


use pipeline::Embedder;

use crate::{ChunkConfig, RetrievalError};

/// Embedded corpus chunks, kept in corpus order.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    chunks: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Chunks `corpus` and embeds every chunk in a single batch call.
    pub async fn build(
        corpus: &str,
        embedder: &dyn Embedder,
        chunking: &ChunkConfig,
    ) -> Result<Self, RetrievalError> {
        let chunks = chunking.split(corpus);
        if chunks.is_empty() {
            return Ok(Self::default());
        }

        let vectors = embedder.embed(&chunks).await?;
        if vectors.len() != chunks.len() {
            return Err(RetrievalError::EmbeddingMismatch {
                expected: chunks.len(),
                received: vectors.len(),
            });
        }

        tracing::debug!(chunks = chunks.len(), "built retrieval index");
        Ok(Self { chunks, vectors })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns up to `k` chunks most similar to `question`, best match first.
    ///
    /// The question is embedded with the same embedder used to build the
    /// index. Equal scores keep corpus order.
    pub async fn query(
        &self,
        question: &str,
        embedder: &dyn Embedder,
        k: usize,
    ) -> Result<Vec<String>, RetrievalError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut embedded = embedder.embed(&[question.to_string()]).await?;
        if embedded.len() != 1 {
            return Err(RetrievalError::EmbeddingMismatch {
                expected: 1,
                received: embedded.len(),
            });
        }
        let query = embedded.remove(0);

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(&query, v)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(i, _)| self.chunks[i].clone())
            .collect())
    }
}

/// Cosine similarity of two vectors; 0.0 when lengths differ, either is zero,
/// or the result is not finite.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_similarity_one() {
        let s = cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!((s - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_have_similarity_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn degenerate_inputs_score_zero() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn non_finite_components_score_zero() {
        assert_eq!(cosine_similarity(&[f32::NAN, 1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[f32::INFINITY, 1.0], &[1.0, 0.0]), 0.0);
    }
}
