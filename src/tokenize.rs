//! Tokenizer collaborator interface and the default Unicode implementation

use std::fmt::Debug;
use unicode_segmentation::UnicodeSegmentation;

/// Errors that can occur during tokenization
#[derive(Debug, thiserror::Error)]
pub enum TokenizerError {
    /// Tokenization failed
    #[error("tokenization failed: {0}")]
    Failed(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for tokenizer operations
pub type TokenizerResult<T> = Result<T, TokenizerError>;

/// Core trait for tokenizer collaborators.
///
/// The sparse index stores the tokenizer it was built with, so the same
/// implementation is applied to chunks at build time and to queries at
/// search time. Implementations must emit ordered lowercase word tokens.
pub trait Tokenizer: Send + Sync + Debug {
    /// Split text into ordered lowercase tokens
    fn tokenize(&self, text: &str) -> TokenizerResult<Vec<String>>;

    /// Get the tokenizer name (e.g., "unicode-words")
    fn name(&self) -> &str;
}

/// Word tokenizer backed by Unicode segmentation (UAX #29 word boundaries),
/// lowercasing every token. Punctuation and whitespace are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeTokenizer;

impl Tokenizer for UnicodeTokenizer {
    fn tokenize(&self, text: &str) -> TokenizerResult<Vec<String>> {
        Ok(text.unicode_words().map(|w| w.to_lowercase()).collect())
    }

    fn name(&self) -> &str {
        "unicode-words"
    }
}
