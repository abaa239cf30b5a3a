//! Ranking indexes built over a corpus snapshot
//!
//! Both indexes are immutable after build and safe for unlimited
//! concurrent read-only queries. Rebuilding means constructing a fresh
//! index from a new corpus snapshot; see `EngineHandle` for the
//! build-then-publish swap.

mod dense;
mod sparse;

pub use dense::DenseIndex;
pub use sparse::SparseIndex;
