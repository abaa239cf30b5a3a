//! Reciprocal Rank Fusion (RRF)
//!
//! Merges two independently ranked hit lists into one ranking using only
//! ranks. Dense cosine scores and BM25 scores live on unrelated scales and
//! cannot be averaged directly; rank-based fusion is scale-invariant
//! across heterogeneous scoring systems.
//!
//! The fusion is a pure function: no I/O, no mutable state, bit-identical
//! output for identical inputs.

use crate::error::{Error, Result};
use crate::types::{ChunkId, ContributingRanks, RankedHit};
use std::collections::HashMap;

/// Default RRF rank decay constant
pub const DEFAULT_RRF_K: usize = 60;

/// Reciprocal Rank Fusion parameters
#[derive(Debug, Clone, Copy)]
pub struct RrfConfig {
    /// K parameter controlling rank decay
    pub k: usize,
}

impl Default for RrfConfig {
    fn default() -> Self {
        Self { k: DEFAULT_RRF_K }
    }
}

/// Fused ranking entry, before metadata enrichment
#[derive(Debug, Clone, PartialEq)]
pub struct FusedScore {
    pub chunk_id: ChunkId,
    pub rrf_score: f64,
    pub ranks: ContributingRanks,
}

/// Fuse two ranked lists into one ranking.
///
/// Every chunk appearing in either list scores the sum of
/// `1 / (k + rank + 1)` over the lists containing it, where rank is the
/// chunk's 0-based position in that list. Chunks found by both signals are
/// rewarded; a chunk missing from one list simply contributes nothing for
/// it. Both rank terms are always added symmetrically; neither signal is
/// weighted over the other.
///
/// Output is sorted by descending fused score, ties broken by ascending
/// `chunk_id`, truncated to `top_n`. If a chunk appears more than once in
/// one list, its first (best) rank wins.
pub fn reciprocal_rank_fusion(
    dense_hits: &[RankedHit],
    sparse_hits: &[RankedHit],
    config: &RrfConfig,
    top_n: usize,
) -> Result<Vec<FusedScore>> {
    if top_n == 0 {
        return Err(Error::InvalidArgument(
            "top_n must be positive".to_string(),
        ));
    }

    let mut ranks: HashMap<&str, ContributingRanks> = HashMap::new();

    for (rank, hit) in dense_hits.iter().enumerate() {
        let entry = ranks.entry(hit.chunk_id.as_str()).or_default();
        if entry.dense.is_none() {
            entry.dense = Some(rank);
        }
    }
    for (rank, hit) in sparse_hits.iter().enumerate() {
        let entry = ranks.entry(hit.chunk_id.as_str()).or_default();
        if entry.sparse.is_none() {
            entry.sparse = Some(rank);
        }
    }

    let k = config.k as f64;
    let mut fused: Vec<FusedScore> = ranks
        .into_iter()
        .map(|(chunk_id, ranks)| {
            // Fixed accumulation order (dense first) keeps the sum
            // bit-identical across runs
            let mut score = 0.0f64;
            if let Some(rank) = ranks.dense {
                score += 1.0 / (k + rank as f64 + 1.0);
            }
            if let Some(rank) = ranks.sparse {
                score += 1.0 / (k + rank as f64 + 1.0);
            }
            FusedScore {
                chunk_id: chunk_id.to_string(),
                rrf_score: score,
                ranks,
            }
        })
        .collect();

    fused.sort_by(|a, b| {
        b.rrf_score
            .partial_cmp(&a.rrf_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
    fused.truncate(top_n);

    Ok(fused)
}
