//! Flat exact dense index over normalized embeddings
//!
//! Stores one L2-normalized vector per chunk in a contiguous buffer and
//! scores queries by exact inner product, which equals cosine similarity
//! for unit vectors. Exactness is preferred over approximate structures
//! at corpus sizes in the low thousands.

use crate::corpus::CorpusStore;
use crate::embedding::{Embedder, EmbeddingError};
use crate::error::{Error, Result};
use crate::types::{ChunkId, RankedHit};
use crate::util::l2_normalize;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Chunks embedded per collaborator call during build
const EMBED_BATCH_SIZE: usize = 32;

/// Semantic nearest-neighbor index; read-only after build
pub struct DenseIndex {
    embedder: Arc<dyn Embedder>,
    /// Chunk ids in corpus insertion order
    chunk_ids: Vec<ChunkId>,
    /// Row-major vectors, `dimensions` floats per chunk, L2-normalized
    vectors: Vec<f32>,
    dimensions: usize,
}

/// Serializable index snapshot
#[derive(Serialize, Deserialize)]
struct SavedDense {
    dimensions: usize,
    chunk_ids: Vec<ChunkId>,
    vectors: Vec<f32>,
}

impl DenseIndex {
    /// Build the index by embedding every chunk in the corpus.
    ///
    /// Embedding runs in batches through the collaborator's `embed_batch`;
    /// aggregation into the vector buffer is single-threaded. Every vector
    /// must have the dimensionality the embedder reports.
    pub fn build(corpus: &CorpusStore, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let dimensions = embedder.dimensions();
        if dimensions == 0 {
            return Err(EmbeddingError::Config(
                "embedder reports zero dimensions".to_string(),
            )
            .into());
        }

        info!(
            "Building dense index: {} chunks, {} dimensions, backend '{}'",
            corpus.len(),
            dimensions,
            embedder.name()
        );

        let mut chunk_ids = Vec::with_capacity(corpus.len());
        let mut vectors = Vec::with_capacity(corpus.len() * dimensions);

        let texts: Vec<String> = corpus.iter().map(|c| c.text.clone()).collect();
        for chunk in corpus.iter() {
            chunk_ids.push(chunk.chunk_id.clone());
        }

        for (batch_idx, batch) in texts.chunks(EMBED_BATCH_SIZE).enumerate() {
            let embeddings = embedder.embed_batch(batch)?;
            if embeddings.len() != batch.len() {
                return Err(EmbeddingError::Failed(format!(
                    "embedder returned {} vectors for {} texts",
                    embeddings.len(),
                    batch.len()
                ))
                .into());
            }
            for mut embedding in embeddings {
                if embedding.len() != dimensions {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: dimensions,
                        got: embedding.len(),
                    }
                    .into());
                }
                l2_normalize(&mut embedding);
                vectors.extend_from_slice(&embedding);
            }
            debug!(
                "Embedded batch {}: {} chunks",
                batch_idx,
                batch.len()
            );
        }

        Ok(Self {
            embedder,
            chunk_ids,
            vectors,
            dimensions,
        })
    }

    /// Search for the `top_k` most similar chunks.
    ///
    /// The query is embedded with the same collaborator the index was built
    /// with. Ties are broken by corpus insertion order (stable sort) so
    /// results are deterministic. Embedding failure propagates to the
    /// caller; no retry happens here.
    pub fn search(&self, query_text: &str, top_k: usize) -> Result<Vec<RankedHit>> {
        if top_k == 0 {
            return Err(Error::InvalidArgument(
                "top_k must be positive".to_string(),
            ));
        }

        let mut query = self.embedder.embed(query_text)?;
        if query.len() != self.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                got: query.len(),
            }
            .into());
        }
        l2_normalize(&mut query);

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(idx, row)| {
                let score: f32 = row.iter().zip(query.iter()).map(|(a, b)| a * b).sum();
                (idx, score)
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);

        let hits: Vec<RankedHit> = scored
            .into_iter()
            .enumerate()
            .map(|(rank, (idx, score))| RankedHit {
                chunk_id: self.chunk_ids[idx].clone(),
                rank,
                raw_score: score,
            })
            .collect();

        debug!("Dense search: {} hits", hits.len());
        Ok(hits)
    }

    /// Get the number of indexed chunks
    pub fn len(&self) -> usize {
        self.chunk_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunk_ids.is_empty()
    }

    /// Get the embedding dimensions
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Save the index snapshot to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let saved = SavedDense {
            dimensions: self.dimensions,
            chunk_ids: self.chunk_ids.clone(),
            vectors: self.vectors.clone(),
        };
        let data = bincode::serialize(&saved)
            .map_err(|e| Error::Codec(format!("failed to serialize dense index: {}", e)))?;
        std::fs::write(path, data)?;
        info!("Saved dense index to {}", path.display());
        Ok(())
    }

    /// Load an index snapshot, re-attaching the embedding collaborator the
    /// index was built with. The embedder's dimensionality must match the
    /// snapshot's.
    pub fn load(path: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let saved: SavedDense = bincode::deserialize(&data)
            .map_err(|e| Error::Codec(format!("failed to deserialize dense index: {}", e)))?;

        if embedder.dimensions() != saved.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: saved.dimensions,
                got: embedder.dimensions(),
            }
            .into());
        }

        info!(
            "Loaded dense index from {}: {} chunks, {} dimensions",
            path.display(),
            saved.chunk_ids.len(),
            saved.dimensions
        );

        Ok(Self {
            embedder,
            chunk_ids: saved.chunk_ids,
            vectors: saved.vectors,
            dimensions: saved.dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingResult;
    use crate::types::{Chunk, Embedding};

    /// Embedder returning fixed vectors keyed by exact text
    #[derive(Debug)]
    struct FixtureEmbedder {
        dims: usize,
        fixtures: Vec<(String, Embedding)>,
    }

    impl Embedder for FixtureEmbedder {
        fn embed(&self, text: &str) -> EmbeddingResult<Embedding> {
            self.fixtures
                .iter()
                .find(|(t, _)| t == text)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| EmbeddingError::Failed(format!("no fixture for '{}'", text)))
        }

        fn dimensions(&self) -> usize {
            self.dims
        }

        fn name(&self) -> &str {
            "fixture"
        }
    }

    fn corpus_of(texts: &[(&str, &str)]) -> CorpusStore {
        CorpusStore::load(
            texts
                .iter()
                .map(|(id, text)| Chunk::new(*id, *text))
                .collect(),
        )
        .unwrap()
    }

    fn fixture_index(fixtures: Vec<(String, Embedding)>) -> DenseIndex {
        let chunks: Vec<Chunk> = fixtures
            .iter()
            .filter(|(t, _)| !t.starts_with("query"))
            .map(|(t, _)| Chunk::new(t.clone(), t.clone()))
            .collect();
        let corpus = CorpusStore::load(chunks).unwrap();
        let embedder = Arc::new(FixtureEmbedder { dims: 4, fixtures });
        DenseIndex::build(&corpus, embedder).unwrap()
    }

    #[test]
    fn test_build_and_search_ranks_by_similarity() {
        let fixtures = vec![
            ("axis x".to_string(), vec![1.0, 0.0, 0.0, 0.0]),
            ("axis y".to_string(), vec![0.0, 1.0, 0.0, 0.0]),
            ("near x".to_string(), vec![0.9, 0.1, 0.0, 0.0]),
            ("query x".to_string(), vec![1.0, 0.0, 0.0, 0.0]),
        ];
        let index = fixture_index(fixtures);

        let hits = index.search("query x", 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_id, "axis x");
        assert_eq!(hits[0].rank, 0);
        assert!(hits[0].raw_score > 0.99);
        assert_eq!(hits[1].chunk_id, "near x");
        assert_eq!(hits[1].rank, 1);
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        // Two chunks with identical vectors; the earlier insertion wins
        let fixtures = vec![
            ("second alphabetically but first inserted".to_string(), vec![1.0, 0.0, 0.0, 0.0]),
            ("first alphabetically but second inserted".to_string(), vec![1.0, 0.0, 0.0, 0.0]),
            ("query x".to_string(), vec![1.0, 0.0, 0.0, 0.0]),
        ];
        let index = fixture_index(fixtures);

        let hits = index.search("query x", 2).unwrap();
        assert_eq!(hits[0].chunk_id, "second alphabetically but first inserted");
        assert_eq!(hits[1].chunk_id, "first alphabetically but second inserted");
    }

    #[test]
    fn test_top_k_zero_is_invalid_argument() {
        let fixtures = vec![
            ("a".to_string(), vec![1.0, 0.0, 0.0, 0.0]),
            ("query".to_string(), vec![1.0, 0.0, 0.0, 0.0]),
        ];
        let corpus = corpus_of(&[("a", "a")]);
        let index =
            DenseIndex::build(&corpus, Arc::new(FixtureEmbedder { dims: 4, fixtures })).unwrap();
        assert!(matches!(
            index.search("query", 0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_top_k_larger_than_corpus_returns_all() {
        let fixtures = vec![
            ("a".to_string(), vec![1.0, 0.0, 0.0, 0.0]),
            ("b".to_string(), vec![0.0, 1.0, 0.0, 0.0]),
            ("query".to_string(), vec![1.0, 1.0, 0.0, 0.0]),
        ];
        let corpus = corpus_of(&[("a", "a"), ("b", "b")]);
        let index =
            DenseIndex::build(&corpus, Arc::new(FixtureEmbedder { dims: 4, fixtures })).unwrap();
        let hits = index.search("query", 50).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_build_rejects_dimension_mismatch() {
        let fixtures = vec![
            ("a".to_string(), vec![1.0, 0.0]), // 2 dims, embedder claims 4
        ];
        let corpus = corpus_of(&[("a", "a")]);
        let result = DenseIndex::build(&corpus, Arc::new(FixtureEmbedder { dims: 4, fixtures }));
        assert!(matches!(
            result,
            Err(Error::Embedding(EmbeddingError::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn test_query_embedding_failure_propagates() {
        let fixtures = vec![("a".to_string(), vec![1.0, 0.0, 0.0, 0.0])];
        let corpus = corpus_of(&[("a", "a")]);
        let index =
            DenseIndex::build(&corpus, Arc::new(FixtureEmbedder { dims: 4, fixtures })).unwrap();
        // "unknown query" has no fixture, the collaborator fails
        assert!(matches!(
            index.search("unknown query", 3),
            Err(Error::Embedding(EmbeddingError::Failed(_)))
        ));
    }

    #[test]
    fn test_stored_vectors_are_normalized() {
        // Un-normalized fixture vector must still yield cosine-scale scores
        let fixtures = vec![
            ("a".to_string(), vec![10.0, 0.0, 0.0, 0.0]),
            ("query".to_string(), vec![2.0, 0.0, 0.0, 0.0]),
        ];
        let corpus = corpus_of(&[("a", "a")]);
        let index =
            DenseIndex::build(&corpus, Arc::new(FixtureEmbedder { dims: 4, fixtures })).unwrap();
        let hits = index.search("query", 1).unwrap();
        assert!((hits[0].raw_score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_save_load_roundtrip_preserves_results() {
        let fixtures = vec![
            ("a".to_string(), vec![1.0, 0.0, 0.0, 0.0]),
            ("b".to_string(), vec![0.0, 1.0, 0.0, 0.0]),
            ("query".to_string(), vec![0.9, 0.1, 0.0, 0.0]),
        ];
        let corpus = corpus_of(&[("a", "a"), ("b", "b")]);
        let embedder = Arc::new(FixtureEmbedder {
            dims: 4,
            fixtures: fixtures.clone(),
        });
        let index = DenseIndex::build(&corpus, embedder).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dense.idx");
        index.save(&path).unwrap();

        let reloaded = DenseIndex::load(
            &path,
            Arc::new(FixtureEmbedder { dims: 4, fixtures }),
        )
        .unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.dimensions(), 4);

        let before = index.search("query", 2).unwrap();
        let after = reloaded.search("query", 2).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_load_rejects_mismatched_embedder() {
        let fixtures = vec![("a".to_string(), vec![1.0, 0.0, 0.0, 0.0])];
        let corpus = corpus_of(&[("a", "a")]);
        let index = DenseIndex::build(
            &corpus,
            Arc::new(FixtureEmbedder {
                dims: 4,
                fixtures: fixtures.clone(),
            }),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dense.idx");
        index.save(&path).unwrap();

        let result = DenseIndex::load(&path, Arc::new(FixtureEmbedder { dims: 8, fixtures }));
        assert!(matches!(
            result,
            Err(Error::Embedding(EmbeddingError::DimensionMismatch { .. }))
        ));
    }
}
