//! Embedding collaborator interface with pluggable backends
//!
//! The engine never computes embeddings itself; it calls an injected
//! [`Embedder`]. Any backend works as long as it is deterministic for a
//! fixed model and returns vectors of constant dimensionality for the
//! lifetime of one index.
//!
//! Provided backends:
//! - [`HttpEmbedder`] for OpenAI-compatible HTTP APIs (OpenAI, Azure,
//!   vLLM, Ollama, LM Studio, text-embeddings-inference)
//! - [`HashEmbedder`] producing deterministic hash-based vectors for
//!   tests and model-less operation

mod hashed;
mod http;
mod traits;

pub use hashed::HashEmbedder;
pub use http::{HttpEmbedder, HttpEmbedderConfig};
pub use traits::{Embedder, EmbeddingError, EmbeddingResult};
