//! Overlapping fixed-size chunking.

use crate::RetrievalError;

/// Chunk size and overlap, both counted in characters.
///
/// Consecutive chunks share `overlap` characters so that context spanning a
/// boundary survives in at least one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    size: usize,
    overlap: usize,
}

impl ChunkConfig {
    /// Creates a chunk configuration.
    ///
    /// Fails unless `size > 0` and `overlap < size`.
    pub fn new(size: usize, overlap: usize) -> Result<Self, RetrievalError> {
        if size == 0 || overlap >= size {
            return Err(RetrievalError::InvalidChunkConfig { size, overlap });
        }
        Ok(Self { size, overlap })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Splits `corpus` into chunks of at most `size` characters.
    ///
    /// Each chunk starts `size - overlap` characters after the previous one;
    /// the final chunk may be shorter. An empty corpus yields no chunks.
    pub fn split(&self, corpus: &str) -> Vec<String> {
        let chars: Vec<char> = corpus.chars().collect();
        let step = self.size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            size: 500,
            overlap: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert_eq!(
            ChunkConfig::new(10, 10),
            Err(RetrievalError::InvalidChunkConfig {
                size: 10,
                overlap: 10
            })
        );
        assert!(ChunkConfig::new(0, 0).is_err());
        assert!(ChunkConfig::new(10, 9).is_ok());
    }

    #[test]
    fn empty_corpus_has_no_chunks() {
        assert!(ChunkConfig::default().split("").is_empty());
    }

    #[test]
    fn short_corpus_is_a_single_chunk() {
        let chunks = ChunkConfig::default().split("2023 batch: 40% placed");
        assert_eq!(chunks, vec!["2023 batch: 40% placed".to_string()]);
    }

    #[test]
    fn consecutive_chunks_share_the_overlap() {
        let config = ChunkConfig::new(4, 2).unwrap();
        let chunks = config.split("abcdefgh");
        assert_eq!(chunks, vec!["abcd", "cdef", "efgh"]);
    }

    #[test]
    fn final_chunk_may_be_shorter() {
        let config = ChunkConfig::new(5, 1).unwrap();
        let chunks = config.split("abcdefghijk");
        assert_eq!(chunks, vec!["abcde", "efghi", "ijk"]);
    }

    #[test]
    fn multibyte_characters_are_never_split() {
        let config = ChunkConfig::new(3, 1).unwrap();
        let chunks = config.split("héllo wörld");
        assert_eq!(chunks, vec!["hél", "llo", "o w", "wör", "rld"]);
    }

    #[test]
    fn default_matches_documented_sizes() {
        let config = ChunkConfig::default();
        assert_eq!((config.size(), config.overlap()), (500, 50));

        let corpus = "x".repeat(1000);
        let chunks = config.split(&corpus);
        let lengths: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
        assert_eq!(lengths, vec![500, 500, 100]);
    }
}
