//! Retrieval facade combining dense and sparse search
//!
//! Single entry point for a query: runs both index searches, fuses the
//! rankings, and enriches surviving chunk ids with source metadata from
//! the corpus store. All state is held by explicit structures passed in at
//! construction; multiple engines over different corpora can coexist.

use crate::config::{RetrievalConfig, SignalFailurePolicy};
use crate::corpus::CorpusStore;
use crate::error::{Error, Result, Signal};
use crate::index::{DenseIndex, SparseIndex};
use crate::retrieval::fusion::{reciprocal_rank_fusion, RrfConfig};
use crate::types::{FusedHit, RankedHit};
use crate::util::truncate_str;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// Hybrid retrieval engine over one corpus snapshot.
///
/// Immutable and safe for unlimited concurrent read-only queries; no
/// locking happens on the read path.
pub struct RetrievalEngine {
    corpus: Arc<CorpusStore>,
    dense: Arc<DenseIndex>,
    sparse: Arc<SparseIndex>,
    config: RetrievalConfig,
}

impl RetrievalEngine {
    /// Create a new retrieval engine.
    ///
    /// The corpus and both indexes must come from the same snapshot;
    /// fusion over misaligned ids is undefined and surfaces as `NotFound`
    /// during enrichment.
    pub fn new(
        corpus: Arc<CorpusStore>,
        dense: Arc<DenseIndex>,
        sparse: Arc<SparseIndex>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            corpus,
            dense,
            sparse,
            config,
        }
    }

    /// Retrieve fused results for a query using the engine's configuration
    pub fn retrieve(&self, query_text: &str) -> Result<Vec<FusedHit>> {
        self.retrieve_with(query_text, &self.config)
    }

    /// Retrieve fused results with an explicit per-call configuration
    pub fn retrieve_with(
        &self,
        query_text: &str,
        config: &RetrievalConfig,
    ) -> Result<Vec<FusedHit>> {
        if config.dense_k == 0 || config.sparse_k == 0 {
            return Err(Error::InvalidArgument(
                "dense_k and sparse_k must be positive".to_string(),
            ));
        }
        if config.top_n == 0 {
            return Err(Error::InvalidArgument(
                "top_n must be positive".to_string(),
            ));
        }
        if query_text.trim().is_empty() {
            return Ok(Vec::new());
        }

        // The two sub-searches have no data dependency; they run here in
        // sequence over immutable state, so callers may also issue them
        // from concurrent tasks.
        let (dense_hits, dense_failure) = self.run_signal(
            Signal::Dense,
            config,
            || self.dense.search(query_text, config.dense_k),
        )?;
        let (sparse_hits, sparse_failure) = self.run_signal(
            Signal::Sparse,
            config,
            || self.sparse.search(query_text, config.sparse_k),
        )?;

        // Degraded mode still needs at least one working signal
        if let (Some(first), Some(_)) = (dense_failure, sparse_failure) {
            return Err(Error::retrieval(Signal::Dense, first));
        }

        let rrf_config = RrfConfig { k: config.rrf_k };
        let fused = reciprocal_rank_fusion(&dense_hits, &sparse_hits, &rrf_config, config.top_n)?;

        let mut results = Vec::with_capacity(fused.len());
        for entry in fused {
            // A miss here means the indexes and corpus are not from the
            // same snapshot; fail loudly rather than dropping the hit
            let chunk = self.corpus.get(&entry.chunk_id)?;
            results.push(FusedHit {
                chunk_id: entry.chunk_id,
                rrf_score: entry.rrf_score,
                title: chunk.title.clone(),
                url: chunk.url.clone(),
                text: chunk.text.clone(),
                ranks: entry.ranks,
            });
        }

        info!(
            "Hybrid retrieve for '{}': {} dense, {} sparse, {} fused",
            truncate_str(query_text, 50),
            dense_hits.len(),
            sparse_hits.len(),
            results.len()
        );

        Ok(results)
    }

    /// Run one sub-search, applying the configured failure policy.
    ///
    /// Returns the hits plus the swallowed error when the policy degraded
    /// the failure to an empty list.
    fn run_signal(
        &self,
        signal: Signal,
        config: &RetrievalConfig,
        search: impl FnOnce() -> Result<Vec<RankedHit>>,
    ) -> Result<(Vec<RankedHit>, Option<Error>)> {
        match search() {
            Ok(hits) => Ok((hits, None)),
            Err(err) => match config.on_signal_failure {
                SignalFailurePolicy::Fail => Err(Error::retrieval(signal, err)),
                SignalFailurePolicy::DegradeToSingle => {
                    warn!("{} search failed, degrading to single signal: {}", signal, err);
                    Ok((Vec::new(), Some(err)))
                }
            },
        }
    }

    /// Get the corpus snapshot this engine serves
    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    /// Get the engine's retrieval configuration
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }
}

/// Build-then-publish holder for a retrieval engine.
///
/// Rebuilding an index is not safe against a live engine instance; readers
/// take an `Arc` snapshot via [`current`](Self::current) and rebuilds swap
/// the pointer atomically with [`publish`](Self::publish). In-flight
/// queries keep the snapshot they started with.
pub struct EngineHandle {
    current: RwLock<Arc<RetrievalEngine>>,
}

impl EngineHandle {
    pub fn new(engine: Arc<RetrievalEngine>) -> Self {
        Self {
            current: RwLock::new(engine),
        }
    }

    /// Get the currently published engine snapshot
    pub fn current(&self) -> Arc<RetrievalEngine> {
        self.current.read().clone()
    }

    /// Atomically replace the published engine with a freshly built one
    pub fn publish(&self, engine: Arc<RetrievalEngine>) {
        *self.current.write() = engine;
        info!("Published new retrieval engine snapshot");
    }

    /// Retrieve against the currently published snapshot
    pub fn retrieve(&self, query_text: &str) -> Result<Vec<FusedHit>> {
        self.current().retrieve(query_text)
    }
}
