//! Error taxonomy for the retrieval engine
//!
//! Build-time integrity failures are fatal and never silently repaired;
//! query-time collaborator failures surface to the caller of `retrieve`
//! without internal retries (retry/backoff policy belongs to the caller).

use crate::embedding::EmbeddingError;
use crate::tokenize::TokenizerError;
use crate::types::ChunkId;
use std::fmt;

/// Errors produced by the retrieval engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The corpus violated a load-time invariant (duplicate ids, empty text)
    #[error("corpus integrity violation: {0}")]
    Integrity(String),

    /// A caller-supplied argument was out of range or malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Chunk id lookup miss
    #[error("chunk not found: {0}")]
    NotFound(ChunkId),

    /// The embedding collaborator failed
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// The tokenizer collaborator failed
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    /// A sub-search failed during `retrieve`
    #[error("{signal} search failed")]
    Retrieval {
        signal: Signal,
        #[source]
        source: Box<Error>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An index snapshot or corpus file could not be (de)serialized
    #[error("codec error: {0}")]
    Codec(String),
}

impl Error {
    /// Wrap a sub-search failure with the signal that produced it
    pub(crate) fn retrieval(signal: Signal, source: Error) -> Self {
        Error::Retrieval {
            signal,
            source: Box::new(source),
        }
    }
}

/// The retrieval signal that produced a hit or a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Dense,
    Sparse,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dense => "dense",
            Self::Sparse => "sparse",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for retrieval operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_display() {
        assert_eq!(Signal::Dense.to_string(), "dense");
        assert_eq!(Signal::Sparse.to_string(), "sparse");
    }

    #[test]
    fn test_retrieval_error_preserves_source() {
        let err = Error::retrieval(
            Signal::Sparse,
            Error::InvalidArgument("top_k must be positive".to_string()),
        );
        assert_eq!(err.to_string(), "sparse search failed");
        let source = std::error::Error::source(&err).expect("source should be set");
        assert!(source.to_string().contains("top_k"));
    }
}
