use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::embedding::{
    cosine_similarity, semantic_similarity, CacheStats, EmbeddingCache, EmbeddingError,
    EmbeddingProvider,
};
use crate::extraction::SkillMention;
use crate::normalize::{normalize_text, normalize_title};
use crate::taxonomy::{SkillId, SkillTerm};
use crate::Posting;

/// A missing posting skill that sits close to one the candidate has.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearMatch {
    pub missing: SkillId,
    pub closest: SkillId,
    /// Raw cosine similarity of the two skill labels.
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedTitle {
    pub title: String,
    pub similarity: f64,
    pub postings: usize,
}

/// Embedding-space similarity on top of a run-scoped [`EmbeddingCache`].
///
/// One matcher per run: the cache, and every vector in it, goes away with it.
pub struct SemanticMatcher {
    cache: EmbeddingCache,
}

impl SemanticMatcher {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            cache: EmbeddingCache::new(provider),
        }
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        self.cache.provider()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Cosine similarity rescaled to [0, 1]. Blank text on either side scores 0
    /// without calling the provider.
    pub fn semantic_score(
        &self,
        candidate_text: &str,
        posting_text: &str,
    ) -> Result<f64, EmbeddingError> {
        if normalize_text(candidate_text).is_empty() || normalize_text(posting_text).is_empty() {
            return Ok(0.0);
        }

        let candidate = self.cache.get_or_embed(candidate_text)?;
        let posting = self.cache.get_or_embed(posting_text)?;
        Ok(semantic_similarity(&candidate, &posting))
    }

    /// For each missing skill, the candidate skill whose label is closest, when
    /// the raw cosine reaches `threshold`. Earlier candidate skills win ties.
    pub fn near_matches(
        &self,
        missing: &[&SkillTerm],
        candidate: &[SkillMention],
        threshold: f64,
    ) -> Result<Vec<NearMatch>, EmbeddingError> {
        if missing.is_empty() || candidate.is_empty() {
            return Ok(Vec::new());
        }

        let candidate_vectors = candidate
            .iter()
            .map(|mention| {
                self.cache
                    .get_or_embed(&mention.term.label)
                    .map(|vector| (mention.id(), vector))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut near = Vec::new();
        for term in missing {
            let missing_vector = self.cache.get_or_embed(&term.label)?;

            let mut best: Option<(&SkillId, f64)> = None;
            for (id, vector) in &candidate_vectors {
                let Some(similarity) = cosine_similarity(&missing_vector, vector) else {
                    continue;
                };
                if best.map_or(true, |(_, current)| similarity > current) {
                    best = Some((*id, similarity));
                }
            }

            if let Some((closest, similarity)) = best {
                if similarity >= threshold {
                    near.push(NearMatch {
                        missing: term.id.clone(),
                        closest: closest.clone(),
                        similarity,
                    });
                }
            }
        }
        Ok(near)
    }

    /// Distinct posting titles close to `query`, most similar first, then most
    /// frequent. Titles are compared on their [`normalize_title`] form and the
    /// query's own title is excluded.
    pub fn related_titles(
        &self,
        query: &str,
        postings: &[Posting],
        top_n: usize,
        min_similarity: f64,
    ) -> Result<Vec<RelatedTitle>, EmbeddingError> {
        let query_title = normalize_title(query);
        if query_title.is_empty() {
            return Ok(Vec::new());
        }

        let mut counts: HashMap<String, usize> = HashMap::new();
        for title in postings.iter().filter_map(|p| p.title.as_deref()) {
            let cleaned = normalize_title(title);
            if !cleaned.is_empty() && cleaned != query_title {
                *counts.entry(cleaned).or_default() += 1;
            }
        }

        let query_vector = self.cache.get_or_embed(&query_title)?;
        let mut related = Vec::new();
        for (title, postings) in counts {
            let vector = self.cache.get_or_embed(&title)?;
            let Some(similarity) = cosine_similarity(&query_vector, &vector) else {
                continue;
            };
            if similarity >= min_similarity {
                related.push(RelatedTitle {
                    title,
                    similarity,
                    postings,
                });
            }
        }

        related.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| b.postings.cmp(&a.postings))
                .then_with(|| a.title.cmp(&b.title))
        });
        related.truncate(top_n);
        Ok(related)
    }
}

impl std::fmt::Debug for SemanticMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticMatcher")
            .field("provider", &self.provider().name())
            .field("cache", &self.cache_stats())
            .finish()
    }
}
