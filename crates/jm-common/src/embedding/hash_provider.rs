use std::hash::{Hash, Hasher};

use siphasher::sip::SipHasher13;

use super::{tokenizer, EmbeddingConfig, EmbeddingError, EmbeddingProvider};

/// Fixed seeds keep vectors stable across processes and Rust releases.
/// Changing them changes every vector: bump `version()` with them.
const HASH_SEED_K0: u64 = 0x0123_4567_89ab_cdef;
const HASH_SEED_K1: u64 = 0xfedc_ba98_7654_3210;

/// Feature-hashing provider.
///
/// - no model, no training
/// - O(n) in the number of features
/// - signed buckets so collisions partly cancel out
/// - SipHash-1-3 with fixed keys, deterministic across runs
pub struct HashEmbeddingProvider {
    pub config: EmbeddingConfig,
}

impl HashEmbeddingProvider {
    pub fn new(config: EmbeddingConfig) -> Self {
        let mut cfg = config;
        cfg.dimension = cfg.dimension.max(1);
        Self { config: cfg }
    }

    fn hash_feature(&self, feature: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        feature.hash(&mut hasher);
        hasher.finish()
    }

    fn bucket(&self, feature: &str) -> usize {
        (self.hash_feature(feature) % self.config.dimension as u64) as usize
    }

    fn tokens_to_vector(&self, tokens: &[tokenizer::WeightedToken]) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.config.dimension];

        for wt in tokens {
            let idx = self.bucket(&wt.token);
            // even hash -> +weight, odd -> -weight
            let sign = if self.hash_feature(&format!("{}_sign", wt.token)) % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            vector[idx] += sign * wt.weight;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl EmbeddingProvider for HashEmbeddingProvider {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn version(&self) -> &str {
        // bump when tokenizer features or hashing change
        "hash-v1"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Blank text embeds to the zero vector, which scores 0 against anything.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let tokens = tokenizer::tokenize_text(text);
        Ok(self.tokens_to_vector(&tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::semantic_similarity;

    fn provider() -> HashEmbeddingProvider {
        HashEmbeddingProvider::new(EmbeddingConfig::default())
    }

    #[test]
    fn produces_unit_vectors() {
        let vector = provider()
            .embed("Senior data engineer, Spark and Airflow")
            .unwrap();
        assert_eq!(vector.len(), 256);

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "L2 norm should be 1.0, got {norm}");
    }

    #[test]
    fn is_deterministic_and_case_insensitive() {
        let provider = provider();
        assert_eq!(
            provider.embed("Data Engineer").unwrap(),
            provider.embed("data   engineer").unwrap()
        );
    }

    #[test]
    fn blank_text_is_zero_vector() {
        let vector = provider().embed("   ").unwrap();
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn overlapping_texts_score_higher() {
        let provider = provider();
        let posting = provider
            .embed("Data engineer building Spark pipelines on AWS")
            .unwrap();
        let close = provider
            .embed("Data engineer with Spark pipelines experience")
            .unwrap();
        let far = provider
            .embed("Pastry chef, croissants and viennoiseries")
            .unwrap();

        let close_score = semantic_similarity(&posting, &close);
        let far_score = semantic_similarity(&posting, &far);
        assert!(
            close_score > far_score,
            "overlapping text should score higher: {close_score} vs {far_score}"
        );
    }

    #[test]
    fn zero_dimension_is_clamped() {
        let provider = HashEmbeddingProvider::new(EmbeddingConfig {
            dimension: 0,
            ..EmbeddingConfig::default()
        });
        assert_eq!(provider.dimension(), 1);
        assert_eq!(provider.embed("rust").unwrap().len(), 1);
    }
}
