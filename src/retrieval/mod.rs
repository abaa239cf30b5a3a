//! Hybrid retrieval: rank fusion and the query facade
//!
//! Combines:
//! - Dense vector search (exact inner product)
//! - BM25 lexical search
//! - Reciprocal Rank Fusion (RRF) to merge the two rankings

mod engine;
mod fusion;

pub use engine::{EngineHandle, RetrievalEngine};
pub use fusion::{reciprocal_rank_fusion, FusedScore, RrfConfig, DEFAULT_RRF_K};
