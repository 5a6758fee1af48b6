use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, warn};

use super::lexical::{lexical_score, LexicalMatch};
use super::semantic::{NearMatch, SemanticMatcher};
use super::weights::{LexicalWeights, ScoreWeights, LEXICAL_ONLY};
use crate::extraction::SkillMention;
use crate::taxonomy::{SkillCategory, SkillId, SkillTerm};
use crate::Posting;

/// Whether the semantic signal took part in the global score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScoringMode {
    Full,
    /// Semantic scoring failed for this posting; the global score is lexical only.
    Degraded { reason: String },
}

impl ScoringMode {
    pub fn is_degraded(&self) -> bool {
        matches!(self, ScoringMode::Degraded { .. })
    }
}

/// Assessment of one candidate/posting pair. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Position of the posting in the scored batch.
    pub posting_index: usize,
    pub posting_id: Option<String>,
    pub source: String,
    pub title: Option<String>,
    pub lexical_score: f64,
    /// `None` when semantic weight is zero or scoring degraded.
    pub semantic_score: Option<f64>,
    pub global_score: f64,
    /// Weights actually applied, after normalization and any fallback.
    pub weights: ScoreWeights,
    pub matched_skills: Vec<SkillId>,
    pub missing_required: Vec<SkillId>,
    pub missing_optional: Vec<SkillId>,
    /// Required spoken languages the candidate lacks (also in `missing_required`).
    pub missing_languages: Vec<SkillId>,
    pub required_coverage: f64,
    pub optional_coverage: f64,
    pub near_matches: Vec<NearMatch>,
    pub unscoreable: bool,
    pub mode: ScoringMode,
}

impl MatchResult {
    pub fn is_degraded(&self) -> bool {
        self.mode.is_degraded()
    }
}

/// `weights.lexical * lexical + weights.semantic * semantic` over normalized weights.
///
/// Without a semantic score the weights fall back to [`LEXICAL_ONLY`]. Returns
/// the global score and the weights applied.
pub fn combine_scores(
    lexical: f64,
    semantic: Option<f64>,
    weights: &ScoreWeights,
) -> (f64, ScoreWeights) {
    let applied = match semantic {
        Some(_) => weights.normalized(),
        None => LEXICAL_ONLY,
    };
    let global = applied.lexical * lexical + applied.semantic * semantic.unwrap_or(0.0);
    (global.clamp(0.0, 1.0), applied)
}

/// Global score descending, then lexical score descending, then batch order.
pub fn compare_ranked(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.global_score
        .total_cmp(&a.global_score)
        .then_with(|| b.lexical_score.total_cmp(&a.lexical_score))
        .then_with(|| a.posting_index.cmp(&b.posting_index))
}

pub fn rank_results(results: &mut [MatchResult]) {
    results.sort_by(compare_ranked);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorerConfig {
    pub lexical_weights: LexicalWeights,
    /// Raw cosine a missing skill needs to be reported as a near match; `None` disables.
    pub near_match_threshold: Option<f64>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            lexical_weights: LexicalWeights::default(),
            near_match_threshold: None,
        }
    }
}

/// What the scorer needs to know about the candidate, computed once per batch.
#[derive(Debug, Clone, Copy)]
pub struct CandidateView<'a> {
    pub skills: &'a [SkillMention],
    pub text: &'a str,
}

pub struct Scorer<'a> {
    semantic: &'a SemanticMatcher,
    config: ScorerConfig,
}

impl<'a> Scorer<'a> {
    pub fn new(semantic: &'a SemanticMatcher, config: ScorerConfig) -> Self {
        Self { semantic, config }
    }

    pub fn score(
        &self,
        candidate: CandidateView<'_>,
        posting: &Posting,
        posting_index: usize,
        posting_skills: &[SkillMention],
        weights: &ScoreWeights,
    ) -> MatchResult {
        let lexical = lexical_score(candidate.skills, posting_skills, &self.config.lexical_weights);
        let requested = weights.normalized();

        let (semantic_score, mode) = if requested.semantic > 0.0 {
            match self
                .semantic
                .semantic_score(candidate.text, &posting.semantic_text())
            {
                Ok(score) => (Some(score), ScoringMode::Full),
                Err(err) => {
                    warn!(
                        posting_index,
                        posting_id = posting.id.as_deref().unwrap_or("-"),
                        error = %err,
                        "semantic scoring failed; lexical only"
                    );
                    (
                        None,
                        ScoringMode::Degraded {
                            reason: err.to_string(),
                        },
                    )
                }
            }
        } else {
            (None, ScoringMode::Full)
        };

        let (global_score, applied) = combine_scores(lexical.score, semantic_score, &requested);
        let near_matches = self.near_matches(candidate, posting_skills, &lexical);
        let missing_languages = missing_languages(posting_skills, &lexical);

        debug!(
            posting_index,
            lexical = lexical.score,
            semantic = ?semantic_score,
            global = global_score,
            degraded = mode.is_degraded(),
            "posting scored"
        );

        MatchResult {
            posting_index,
            posting_id: posting.id.clone(),
            source: posting.source.clone(),
            title: posting.title.clone(),
            lexical_score: lexical.score,
            semantic_score,
            global_score,
            weights: applied,
            matched_skills: lexical.matched,
            missing_required: lexical.missing_required,
            missing_optional: lexical.missing_optional,
            missing_languages,
            required_coverage: lexical.required_coverage,
            optional_coverage: lexical.optional_coverage,
            near_matches,
            unscoreable: lexical.unscoreable,
            mode,
        }
    }

    fn near_matches(
        &self,
        candidate: CandidateView<'_>,
        posting_skills: &[SkillMention],
        lexical: &LexicalMatch,
    ) -> Vec<NearMatch> {
        let Some(threshold) = self.config.near_match_threshold else {
            return Vec::new();
        };
        if lexical.missing_required.is_empty() {
            return Vec::new();
        }

        let mut missing: Vec<&SkillTerm> = Vec::new();
        for id in &lexical.missing_required {
            if let Some(mention) = posting_skills.iter().find(|m| m.id() == id) {
                missing.push(&mention.term);
            }
        }

        self.semantic
            .near_matches(&missing, candidate.skills, threshold)
            .unwrap_or_else(|err| {
                debug!(error = %err, "near-match diagnostics skipped");
                Vec::new()
            })
    }
}

fn missing_languages(posting_skills: &[SkillMention], lexical: &LexicalMatch) -> Vec<SkillId> {
    lexical
        .missing_required
        .iter()
        .filter(|id| {
            posting_skills
                .iter()
                .any(|m| m.id() == *id && m.category() == SkillCategory::Language)
        })
        .cloned()
        .collect()
}
