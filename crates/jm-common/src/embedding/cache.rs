use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, warn};

use super::{EmbeddingError, EmbeddingProvider};
use crate::normalize::{content_digest, content_hash, normalize_text};

type CachedEmbedding = Result<Arc<[f32]>, EmbeddingError>;
type DigestKey = [u8; 32];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Run-scoped text to vector memo in front of an [`EmbeddingProvider`].
///
/// Keyed by the full [`content_digest`] of the text, so texts differing only in case or
/// spacing share one entry; the provider always sees the normalized text.
/// Failures are memoized too. Dropped with the run that created it.
///
/// Two threads missing on the same key may both call the provider; the first
/// insert wins and both observe the same value.
pub struct EmbeddingCache {
    provider: Arc<dyn EmbeddingProvider>,
    entries: RwLock<HashMap<DigestKey, CachedEmbedding>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EmbeddingCache {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub fn get_or_embed(&self, text: &str) -> CachedEmbedding {
        let key = content_digest(text);

        if let Some(cached) = self.entries.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return cached.clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let computed = self.compute(text);
        if let Err(err) = &computed {
            warn!(
                provider = self.provider.name(),
                key = %content_hash(text),
                error = %err,
                "embedding failed"
            );
        }

        self.entries.write().entry(key).or_insert(computed).clone()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.read().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn compute(&self, text: &str) -> CachedEmbedding {
        let normalized = normalize_text(text);
        let vector = self.provider.embed(&normalized)?;

        let expected = self.provider.dimension();
        if vector.len() != expected {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(EmbeddingError::NonFiniteVector {
                provider: self.provider.name().to_string(),
            });
        }

        debug!(
            provider = self.provider.name(),
            version = self.provider.version(),
            chars = normalized.chars().count(),
            "text embedded"
        );
        Ok(Arc::from(vector))
    }
}
