use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, info_span};

use super::scoring::{rank_results, CandidateView, MatchResult, Scorer};
use super::semantic::{RelatedTitle, SemanticMatcher};
use super::weights::ScoreWeights;
use crate::config::EngineConfig;
use crate::corpus::{self, EmergentSkillReport};
use crate::embedding::{create_provider, EmbeddingError, EmbeddingProvider};
use crate::extraction::{CandidateSkills, SkillExtractor, SkillMention};
use crate::run_id::RunId;
use crate::taxonomy::Taxonomy;
use crate::{CandidateProfile, Posting};

/// Entry point for the presentation layer: batch scoring and corpus aggregation.
///
/// Holds only read-only state (taxonomy, extractor, provider, config), so one
/// engine serves any number of runs. Per-run state lives in [`MatchRun`].
pub struct MatchingEngine {
    extractor: SkillExtractor,
    provider: Arc<dyn EmbeddingProvider>,
    config: EngineConfig,
}

impl MatchingEngine {
    pub fn new(
        taxonomy: Arc<Taxonomy>,
        provider: Arc<dyn EmbeddingProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            extractor: SkillExtractor::new(taxonomy, config.extractor.clone()),
            provider,
            config,
        }
    }

    /// Built-in taxonomy plus the provider named in `config.embedding`.
    pub fn from_config(config: EngineConfig) -> Self {
        let provider = create_provider(&config.embedding);
        Self::new(Arc::new(Taxonomy::builtin()), provider, config)
    }

    pub fn extractor(&self) -> &SkillExtractor {
        &self.extractor
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        self.extractor.taxonomy()
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Attach extracted skills to every posting. Already enriched postings are
    /// extracted again from their current text.
    pub fn enrich(&self, postings: &mut [Posting]) {
        if self.config.parallel {
            postings
                .par_iter_mut()
                .for_each(|posting| self.extractor.enrich(posting));
        } else {
            postings
                .iter_mut()
                .for_each(|posting| self.extractor.enrich(posting));
        }
    }

    /// Opens a run with a fresh id and an empty embedding cache.
    pub fn start_run(&self) -> MatchRun<'_> {
        MatchRun {
            engine: self,
            run_id: RunId::new(),
            semantic: SemanticMatcher::new(Arc::clone(&self.provider)),
        }
    }

    /// Ranked results for one candidate, in a run of their own.
    pub fn score_batch(
        &self,
        candidate: &CandidateProfile,
        postings: &[Posting],
        weights: &ScoreWeights,
    ) -> Vec<MatchResult> {
        self.start_run().score_batch(candidate, postings, weights)
    }

    /// Skill frequencies of `postings`, with trends against `reference` when given.
    pub fn aggregate_skills(
        &self,
        postings: &[Posting],
        reference: Option<&[Posting]>,
    ) -> EmergentSkillReport {
        let run_id = RunId::new();
        let span = info_span!("aggregate_skills", %run_id);
        let _enter = span.enter();

        let current = self.skill_sets(postings);
        let reference = reference.map(|batch| self.skill_sets(batch));
        let report = corpus::aggregate(&current, reference.as_deref(), &self.config.trend);

        info!(
            postings = report.total_postings,
            reference_postings = ?report.reference_postings,
            skills = report.skills.len(),
            rising = report.rising().count(),
            "skills aggregated"
        );
        report
    }

    fn skill_sets(&self, postings: &[Posting]) -> Vec<Vec<SkillMention>> {
        if self.config.parallel {
            postings
                .par_iter()
                .map(|posting| self.extractor.posting_skills(posting))
                .collect()
        } else {
            postings
                .iter()
                .map(|posting| self.extractor.posting_skills(posting))
                .collect()
        }
    }
}

/// One scoring run: a run id for the logs and the embedding cache, both
/// discarded when the run is dropped.
pub struct MatchRun<'e> {
    engine: &'e MatchingEngine,
    run_id: RunId,
    semantic: SemanticMatcher,
}

impl MatchRun<'_> {
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn semantic(&self) -> &SemanticMatcher {
        &self.semantic
    }

    /// Scores every posting, ranks the results and applies the minimum score.
    /// Never fails: a posting whose semantic score cannot be computed is
    /// returned degraded.
    pub fn score_batch(
        &self,
        candidate: &CandidateProfile,
        postings: &[Posting],
        weights: &ScoreWeights,
    ) -> Vec<MatchResult> {
        let candidate_skills = self.candidate_skills(candidate);
        self.score_with_skills(&candidate_skills, candidate, postings, weights)
    }

    /// [`MatchRun::score_batch`] with candidate skills the caller already
    /// extracted through [`MatchRun::candidate_skills`], so what the caller
    /// reports and what is scored are the same set.
    pub fn score_with_skills(
        &self,
        candidate_skills: &CandidateSkills,
        candidate: &CandidateProfile,
        postings: &[Posting],
        weights: &ScoreWeights,
    ) -> Vec<MatchResult> {
        let span = info_span!("score_batch", run_id = %self.run_id, postings = postings.len());
        let _enter = span.enter();

        if !candidate_skills.unknown_explicit.is_empty() {
            debug!(
                unknown = ?candidate_skills.unknown_explicit,
                "explicit candidate skills not in taxonomy"
            );
        }
        let candidate_text = candidate.semantic_text();
        let view = CandidateView {
            skills: &candidate_skills.mentions,
            text: &candidate_text,
        };
        let scorer = Scorer::new(&self.semantic, self.engine.config.scorer);

        let score_one = |(index, posting): (usize, &Posting)| {
            let posting_skills = self.engine.extractor.posting_skills(posting);
            scorer.score(view, posting, index, &posting_skills, weights)
        };
        let mut results: Vec<MatchResult> = if self.engine.config.parallel {
            postings.par_iter().enumerate().map(score_one).collect()
        } else {
            postings.iter().enumerate().map(score_one).collect()
        };

        rank_results(&mut results);
        let scored = results.len();
        if let Some(min) = self.engine.config.min_global_score {
            results.retain(|result| result.global_score >= min);
        }

        let stats = self.semantic.cache_stats();
        info!(
            scored,
            returned = results.len(),
            degraded = results.iter().filter(|r| r.is_degraded()).count(),
            unscoreable = results.iter().filter(|r| r.unscoreable).count(),
            candidate_skills = candidate_skills.mentions.len(),
            cache_entries = stats.entries,
            cache_hits = stats.hits,
            "batch scored"
        );
        results
    }

    /// Candidate skills as the run sees them.
    pub fn candidate_skills(&self, candidate: &CandidateProfile) -> CandidateSkills {
        self.engine.extractor.extract_candidate(candidate)
    }

    pub fn related_titles(
        &self,
        query: &str,
        postings: &[Posting],
        top_n: usize,
        min_similarity: f64,
    ) -> Result<Vec<RelatedTitle>, EmbeddingError> {
        let span = info_span!("related_titles", run_id = %self.run_id);
        let _enter = span.enter();
        self.semantic
            .related_titles(query, postings, top_n, min_similarity)
    }
}
