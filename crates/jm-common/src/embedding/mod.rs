pub mod cache;
pub mod config;
pub mod hash_provider;
pub mod similarity;
pub mod tokenizer;

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

pub use cache::{CacheStats, EmbeddingCache};
pub use config::EmbeddingConfig;
pub use hash_provider::HashEmbeddingProvider;
pub use similarity::{cosine_similarity, rescale_cosine, semantic_similarity};

/// Why a text could not be turned into a usable vector.
///
/// Every variant is recovered per posting by the scorer; none aborts a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbeddingError {
    #[error("embedding provider `{provider}` unavailable: {reason}")]
    Unavailable { provider: String, reason: String },
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("embedding from `{provider}` contains non-finite values")]
    NonFiniteVector { provider: String },
}

impl EmbeddingError {
    pub fn unavailable(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

/// Text to fixed-length vector.
///
/// Implementations:
/// - HashEmbeddingProvider: feature hashing, deterministic, no model
/// - UnavailableProvider: always fails, forces lexical-only scoring
///
/// Anything backed by a real model is injected by the caller through this trait.
/// Implementations must be pure: the same text always yields the same vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Short provider name ("hash", "none"), recorded in logs.
    fn name(&self) -> &'static str;

    /// Bumped whenever the same text would embed differently.
    fn version(&self) -> &str;

    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Default: one `embed` call per text. Model-backed providers should batch.
    fn embed_batch(&self, texts: &[&str]) -> Vec<Result<Vec<f32>, EmbeddingError>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Provider that never produces a vector.
#[derive(Debug, Clone)]
pub struct UnavailableProvider {
    dimension: usize,
    reason: String,
}

impl UnavailableProvider {
    pub fn new(dimension: usize, reason: impl Into<String>) -> Self {
        Self {
            dimension,
            reason: reason.into(),
        }
    }
}

impl EmbeddingProvider for UnavailableProvider {
    fn name(&self) -> &'static str {
        "none"
    }

    fn version(&self) -> &str {
        "v1"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::unavailable(self.name(), self.reason.clone()))
    }
}

/// Provider factory keyed by `EmbeddingConfig::provider`.
///
/// Unknown names fall back to the hash provider.
pub fn create_provider(config: &EmbeddingConfig) -> Arc<dyn EmbeddingProvider> {
    match config.provider.as_str() {
        "hash" => Arc::new(HashEmbeddingProvider::new(config.clone())),
        "none" | "disabled" => Arc::new(UnavailableProvider::new(
            config.dimension,
            "semantic scoring disabled by configuration",
        )),
        other => {
            warn!(
                provider = other,
                "unknown embedding provider; falling back to hash"
            );
            Arc::new(HashEmbeddingProvider::new(config.clone()))
        }
    }
}
