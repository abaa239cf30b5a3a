//! Configuration for the retrieval engine

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// BM25 scoring parameters, fixed when the sparse index is built
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bm25Config {
    /// Term-frequency saturation
    #[serde(default = "default_k1")]
    pub k1: f32,
    /// Length normalization strength
    #[serde(default = "default_b")]
    pub b: f32,
}

fn default_k1() -> f32 {
    1.5
}

fn default_b() -> f32 {
    0.75
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self {
            k1: default_k1(),
            b: default_b(),
        }
    }
}

/// What `retrieve` does when one retrieval signal fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalFailurePolicy {
    /// Fail the whole call, wrapping the first index failure
    #[default]
    Fail,
    /// Degrade to single-signal retrieval with a warning; both signals
    /// failing is still an error
    DegradeToSingle,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Candidates requested from the dense index
    #[serde(default = "default_candidate_k")]
    pub dense_k: usize,
    /// Candidates requested from the sparse index
    #[serde(default = "default_candidate_k")]
    pub sparse_k: usize,
    /// RRF k parameter (rank decay)
    #[serde(default = "default_rrf_k")]
    pub rrf_k: usize,
    /// Number of fused results to return
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Behavior when one sub-search fails
    #[serde(default)]
    pub on_signal_failure: SignalFailurePolicy,
}

fn default_candidate_k() -> usize {
    20
}

fn default_rrf_k() -> usize {
    60
}

fn default_top_n() -> usize {
    5
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            dense_k: default_candidate_k(),
            sparse_k: default_candidate_k(),
            rrf_k: default_rrf_k(),
            top_n: default_top_n(),
            on_signal_failure: SignalFailurePolicy::default(),
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bm25: Bm25Config,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            Error::Codec(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the
    /// user can fix everything in one pass.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.bm25.k1 <= 0.0 {
            errors.push("bm25 k1 must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.bm25.b) {
            errors.push("bm25 b must be in [0, 1]".to_string());
        }

        if self.retrieval.dense_k == 0 {
            errors.push("retrieval dense_k must be positive".to_string());
        }
        if self.retrieval.sparse_k == 0 {
            errors.push("retrieval sparse_k must be positive".to_string());
        }
        if self.retrieval.top_n == 0 {
            errors.push("retrieval top_n must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "invalid configuration:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}
