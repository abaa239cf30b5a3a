//! Deterministic hash-based embedding backend
//!
//! Produces embeddings that are deterministic for the same content but
//! carry no semantic meaning. Useful for tests and for exercising the
//! retrieval pipeline when no embedding model is available.
//!
//! WARNING: hash-based embeddings will not produce meaningful dense
//! search results. Always prefer a real embedding backend when possible.

use super::traits::{Embedder, EmbeddingError, EmbeddingResult};
use crate::types::Embedding;
use crate::util::l2_normalize;
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Embedding backend deriving vectors from an xxh3 hash of the text
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> EmbeddingResult<Self> {
        if dimensions == 0 {
            return Err(EmbeddingError::Config(
                "dimensions must be positive".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> EmbeddingResult<Embedding> {
        let bytes = text.as_bytes();
        let mut vector: Embedding = (0..self.dimensions)
            .map(|i| {
                let hash = xxh3_64_with_seed(bytes, i as u64);
                ((hash % 1000) as f32 / 500.0) - 1.0
            })
            .collect();
        l2_normalize(&mut vector);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hash"
    }
}
