//! Core types for the ragfuse engine

use serde::{Deserialize, Serialize};

/// Unique identifier for a chunk
pub type ChunkId = String;

/// Embedding vector type
pub type Embedding = Vec<f32>;

/// A contiguous span of source text; the atomic retrievable unit.
///
/// Chunks are produced once by the ingestion collaborator and are read-only
/// thereafter. `chunk_id` must be unique across the corpus snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: ChunkId,
    /// URL of the source document
    pub url: String,
    /// Title of the source document
    pub title: String,
    /// Position within the source document (0 = lead/intro chunk)
    pub chunk_index: usize,
    pub text: String,
}

impl Chunk {
    pub fn new(chunk_id: impl Into<ChunkId>, text: impl Into<String>) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            url: String::new(),
            title: String::new(),
            chunk_index: 0,
            text: text.into(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_index(mut self, chunk_index: usize) -> Self {
        self.chunk_index = chunk_index;
        self
    }
}

/// Borrowed metadata view of a chunk, without its text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMeta<'a> {
    pub title: &'a str,
    pub url: &'a str,
    pub chunk_index: usize,
}

/// Result of a single-index search: a chunk at a rank with the index's raw
/// score. Ephemeral, produced per query, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedHit {
    pub chunk_id: ChunkId,
    /// 0-based position in the result list
    pub rank: usize,
    /// Score on the producing index's own scale (cosine or BM25)
    pub raw_score: f32,
}

/// Ranks a chunk held in the lists that contributed to its fused score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributingRanks {
    pub dense: Option<usize>,
    pub sparse: Option<usize>,
}

/// Fusion output enriched with source metadata, handed to the
/// answer-generation collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedHit {
    pub chunk_id: ChunkId,
    pub rrf_score: f64,
    pub title: String,
    pub url: String,
    pub text: String,
    pub ranks: ContributingRanks,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_builder_chaining() {
        let chunk = Chunk::new("c1", "Full chunk text")
            .with_url("https://example.com/article")
            .with_title("Article")
            .with_index(3);

        assert_eq!(chunk.chunk_id, "c1");
        assert_eq!(chunk.text, "Full chunk text");
        assert_eq!(chunk.url, "https://example.com/article");
        assert_eq!(chunk.title, "Article");
        assert_eq!(chunk.chunk_index, 3);
    }

    #[test]
    fn test_chunk_defaults() {
        let chunk = Chunk::new("c1", "text");
        assert!(chunk.url.is_empty());
        assert!(chunk.title.is_empty());
        assert_eq!(chunk.chunk_index, 0);
    }

    #[test]
    fn test_contributing_ranks_default_empty() {
        let ranks = ContributingRanks::default();
        assert!(ranks.dense.is_none());
        assert!(ranks.sparse.is_none());
    }
}
