//! ragfuse: hybrid retrieval and rank fusion over a chunked text corpus
//!
//! Answers a query against a fixed corpus snapshot by fusing two
//! independent retrieval signals:
//! - Dense semantic search over normalized embeddings (exact inner product)
//! - Sparse lexical search via BM25 term statistics
//! - Reciprocal Rank Fusion (RRF) merging the two rankings deterministically
//!
//! Indexes are built once, offline, from an immutable [`CorpusStore`] and
//! are safe for unlimited concurrent read-only queries. Embedding and
//! tokenization are injected collaborators; the engine performs no network
//! I/O of its own.

pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod index;
pub mod retrieval;
pub mod tokenize;
pub mod types;
mod util;

pub use config::Config;
pub use corpus::CorpusStore;
pub use error::{Error, Result};
pub use types::*;
