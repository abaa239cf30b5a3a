//! BM25 lexical index owning its term statistics
//!
//! Tokenizes every chunk with the injected tokenizer collaborator and
//! accumulates inverted postings, per-chunk token counts and the corpus
//! average chunk length. Scores are recomputed fresh on every query from
//! those statistics; nothing score-shaped is ever cached.

use crate::config::Bm25Config;
use crate::corpus::CorpusStore;
use crate::error::{Error, Result};
use crate::tokenize::Tokenizer;
use crate::types::{ChunkId, RankedHit};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Lexical ranked-search index; read-only after build
pub struct SparseIndex {
    tokenizer: Arc<dyn Tokenizer>,
    params: Bm25Config,
    /// Chunk ids in corpus insertion order
    chunk_ids: Vec<ChunkId>,
    /// term -> postings as (chunk ordinal, term frequency)
    postings: HashMap<String, Vec<(u32, u32)>>,
    /// Token count per chunk, insertion order
    doc_lengths: Vec<u32>,
    avg_doc_len: f32,
}

/// Serializable index snapshot
#[derive(Serialize, Deserialize)]
struct SavedSparse {
    params: Bm25Config,
    chunk_ids: Vec<ChunkId>,
    postings: HashMap<String, Vec<(u32, u32)>>,
    doc_lengths: Vec<u32>,
    avg_doc_len: f32,
}

impl SparseIndex {
    /// Build the index by tokenizing every chunk in the corpus.
    ///
    /// Tokenization is independent per chunk; aggregation into the shared
    /// postings table is single-threaded. The tokenizer is retained so the
    /// exact same implementation runs at query time.
    pub fn build(
        corpus: &CorpusStore,
        tokenizer: Arc<dyn Tokenizer>,
        params: Bm25Config,
    ) -> Result<Self> {
        let mut chunk_ids = Vec::with_capacity(corpus.len());
        let mut postings: HashMap<String, Vec<(u32, u32)>> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(corpus.len());

        for (ordinal, chunk) in corpus.iter().enumerate() {
            let tokens = tokenizer.tokenize(&chunk.text)?;

            let mut term_freqs: HashMap<String, u32> = HashMap::new();
            for token in &tokens {
                *term_freqs.entry(token.clone()).or_insert(0) += 1;
            }
            for (term, tf) in term_freqs {
                postings.entry(term).or_default().push((ordinal as u32, tf));
            }

            doc_lengths.push(tokens.len() as u32);
            chunk_ids.push(chunk.chunk_id.clone());
        }

        let total_len: u64 = doc_lengths.iter().map(|&l| l as u64).sum();
        let avg_doc_len = if doc_lengths.is_empty() {
            1.0
        } else {
            (total_len as f32 / doc_lengths.len() as f32).max(1.0)
        };

        info!(
            "Built sparse index: {} chunks, {} terms, avg length {:.1} ({})",
            chunk_ids.len(),
            postings.len(),
            avg_doc_len,
            tokenizer.name()
        );

        Ok(Self {
            tokenizer,
            params,
            chunk_ids,
            postings,
            doc_lengths,
            avg_doc_len,
        })
    }

    /// Search for the `top_k` best-scoring chunks.
    ///
    /// The query is tokenized with the same collaborator the index was
    /// built with. A query with no tokens yields an empty result, not an
    /// error. Ties are broken by corpus insertion order (stable sort).
    /// Chunks matching no query term are not hits.
    pub fn search(&self, query_text: &str, top_k: usize) -> Result<Vec<RankedHit>> {
        if top_k == 0 {
            return Err(Error::InvalidArgument(
                "top_k must be positive".to_string(),
            ));
        }

        let query_tokens = self.tokenizer.tokenize(query_text)?;
        if query_tokens.is_empty() || self.chunk_ids.is_empty() {
            return Ok(Vec::new());
        }

        let n = self.chunk_ids.len();
        let mut scores = vec![0.0f32; n];
        let Bm25Config { k1, b } = self.params;

        // Repeated query tokens contribute once per occurrence
        for token in &query_tokens {
            let Some(posting_list) = self.postings.get(token) else {
                continue;
            };
            let df = posting_list.len() as f32;
            let idf = (1.0 + (n as f32 - df + 0.5) / (df + 0.5)).ln();

            for &(ordinal, tf) in posting_list {
                let tf = tf as f32;
                let len_norm =
                    1.0 - b + b * (self.doc_lengths[ordinal as usize] as f32 / self.avg_doc_len);
                scores[ordinal as usize] += idf * (tf * (k1 + 1.0)) / (tf + k1 * len_norm);
            }
        }

        let mut scored: Vec<(usize, f32)> = scores
            .into_iter()
            .enumerate()
            .filter(|&(_, score)| score > 0.0)
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);

        let hits: Vec<RankedHit> = scored
            .into_iter()
            .enumerate()
            .map(|(rank, (ordinal, score))| RankedHit {
                chunk_id: self.chunk_ids[ordinal].clone(),
                rank,
                raw_score: score,
            })
            .collect();

        debug!("Sparse search: {} hits", hits.len());
        Ok(hits)
    }

    /// Get the number of indexed chunks
    pub fn len(&self) -> usize {
        self.chunk_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunk_ids.is_empty()
    }

    /// Get the number of distinct terms
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Get the corpus average chunk length in tokens
    pub fn avg_doc_len(&self) -> f32 {
        self.avg_doc_len
    }

    /// Get the BM25 parameters the index was built with
    pub fn params(&self) -> Bm25Config {
        self.params
    }

    /// Save the index snapshot to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let saved = SavedSparse {
            params: self.params,
            chunk_ids: self.chunk_ids.clone(),
            postings: self.postings.clone(),
            doc_lengths: self.doc_lengths.clone(),
            avg_doc_len: self.avg_doc_len,
        };
        let data = bincode::serialize(&saved)
            .map_err(|e| Error::Codec(format!("failed to serialize sparse index: {}", e)))?;
        std::fs::write(path, data)?;
        info!("Saved sparse index to {}", path.display());
        Ok(())
    }

    /// Load an index snapshot, re-attaching the tokenizer collaborator the
    /// index was built with.
    pub fn load(path: impl AsRef<Path>, tokenizer: Arc<dyn Tokenizer>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let saved: SavedSparse = bincode::deserialize(&data)
            .map_err(|e| Error::Codec(format!("failed to deserialize sparse index: {}", e)))?;

        info!(
            "Loaded sparse index from {}: {} chunks, {} terms",
            path.display(),
            saved.chunk_ids.len(),
            saved.postings.len()
        );

        Ok(Self {
            tokenizer,
            params: saved.params,
            chunk_ids: saved.chunk_ids,
            postings: saved.postings,
            doc_lengths: saved.doc_lengths,
            avg_doc_len: saved.avg_doc_len,
        })
    }
}
