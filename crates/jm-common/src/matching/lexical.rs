use std::collections::HashSet;

use serde::Serialize;

use super::weights::LexicalWeights;
use crate::extraction::{RequirementLevel, SkillMention};
use crate::taxonomy::SkillId;

/// Skill-set overlap between a candidate and one posting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexicalMatch {
    pub score: f64,
    pub required_coverage: f64,
    pub optional_coverage: f64,
    /// Posting skills the candidate has, in posting order.
    pub matched: Vec<SkillId>,
    pub missing_required: Vec<SkillId>,
    pub missing_optional: Vec<SkillId>,
    /// The posting declares no skills at all; `score` is 0.
    pub unscoreable: bool,
}

/// `required_weight * |req ∩ cand| / max(1, |req|) + optional_weight * |opt ∩ cand| / max(1, |opt|)`
///
/// Depends only on the two skill sets, never on raw text. A skill listed at
/// both levels counts as required.
pub fn lexical_score(
    candidate_skills: &[SkillMention],
    posting_skills: &[SkillMention],
    weights: &LexicalWeights,
) -> LexicalMatch {
    let weights = weights.normalized();
    let candidate: HashSet<&SkillId> = candidate_skills.iter().map(SkillMention::id).collect();

    let mut required: Vec<&SkillId> = Vec::new();
    let mut optional: Vec<&SkillId> = Vec::new();
    let mut seen: HashSet<&SkillId> = HashSet::new();
    for mention in posting_skills
        .iter()
        .filter(|m| m.level == RequirementLevel::Required)
    {
        if seen.insert(mention.id()) {
            required.push(mention.id());
        }
    }
    for mention in posting_skills
        .iter()
        .filter(|m| m.level == RequirementLevel::Optional)
    {
        if seen.insert(mention.id()) {
            optional.push(mention.id());
        }
    }

    if required.is_empty() && optional.is_empty() {
        return LexicalMatch {
            score: 0.0,
            required_coverage: 0.0,
            optional_coverage: 0.0,
            matched: Vec::new(),
            missing_required: Vec::new(),
            missing_optional: Vec::new(),
            unscoreable: true,
        };
    }

    let (matched_required, missing_required) = split_by_possession(&required, &candidate);
    let (matched_optional, missing_optional) = split_by_possession(&optional, &candidate);

    let required_coverage = matched_required.len() as f64 / required.len().max(1) as f64;
    let optional_coverage = matched_optional.len() as f64 / optional.len().max(1) as f64;
    let score = (weights.required * required_coverage + weights.optional * optional_coverage)
        .clamp(0.0, 1.0);

    let matched = posting_skills
        .iter()
        .map(SkillMention::id)
        .filter(|id| candidate.contains(id))
        .collect::<Vec<_>>();
    let mut matched_unique: Vec<SkillId> = Vec::with_capacity(matched.len());
    for id in matched {
        if !matched_unique.contains(id) {
            matched_unique.push(id.clone());
        }
    }

    LexicalMatch {
        score,
        required_coverage,
        optional_coverage,
        matched: matched_unique,
        missing_required,
        missing_optional,
        unscoreable: false,
    }
}

fn split_by_possession(
    skills: &[&SkillId],
    candidate: &HashSet<&SkillId>,
) -> (Vec<SkillId>, Vec<SkillId>) {
    let mut had = Vec::new();
    let mut missing = Vec::new();
    for id in skills {
        if candidate.contains(*id) {
            had.push((*id).clone());
        } else {
            missing.push((*id).clone());
        }
    }
    (had, missing)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::taxonomy::{SkillCategory, SkillTerm};

    fn mention(id: &str, level: RequirementLevel) -> SkillMention {
        SkillMention::new(
            Arc::new(SkillTerm::new(id, id, SkillCategory::Hard)),
            level,
        )
    }

    fn required(id: &str) -> SkillMention {
        mention(id, RequirementLevel::Required)
    }

    fn optional(id: &str) -> SkillMention {
        mention(id, RequirementLevel::Optional)
    }

    fn possessed(ids: &[&str]) -> Vec<SkillMention> {
        ids.iter()
            .map(|id| mention(id, RequirementLevel::Possessed))
            .collect()
    }

    fn ids(list: &[SkillId]) -> Vec<&str> {
        list.iter().map(SkillId::as_str).collect()
    }

    #[test]
    fn weights_required_over_optional() {
        let posting = vec![required("python"), required("sql"), optional("communication")];
        let result = lexical_score(
            &possessed(&["python", "communication"]),
            &posting,
            &LexicalWeights::default(),
        );

        assert!((result.score - 0.65).abs() < 1e-12);
        assert_eq!(result.required_coverage, 0.5);
        assert_eq!(result.optional_coverage, 1.0);
        assert_eq!(ids(&result.matched), vec!["python", "communication"]);
        assert_eq!(ids(&result.missing_required), vec!["sql"]);
        assert!(result.missing_optional.is_empty());
        assert!(!result.unscoreable);
    }

    #[test]
    fn posting_without_skills_scores_zero() {
        let result = lexical_score(&possessed(&["python"]), &[], &LexicalWeights::default());
        assert_eq!(result.score, 0.0);
        assert!(result.unscoreable);
    }

    #[test]
    fn empty_optional_region_contributes_nothing() {
        let result = lexical_score(
            &possessed(&["python"]),
            &[required("python")],
            &LexicalWeights::default(),
        );
        assert!((result.score - 0.7).abs() < 1e-12);
    }

    #[test]
    fn candidate_without_skills_misses_everything() {
        let result = lexical_score(
            &[],
            &[required("rust"), optional("docker")],
            &LexicalWeights::default(),
        );
        assert_eq!(result.score, 0.0);
        assert_eq!(ids(&result.missing_required), vec!["rust"]);
        assert_eq!(ids(&result.missing_optional), vec!["docker"]);
    }

    #[test]
    fn skill_at_both_levels_counts_as_required() {
        let posting = vec![required("sql"), optional("sql"), optional("excel")];
        let result = lexical_score(&possessed(&["sql"]), &posting, &LexicalWeights::default());

        assert_eq!(result.required_coverage, 1.0);
        assert_eq!(result.optional_coverage, 0.0);
        assert_eq!(ids(&result.matched), vec!["sql"]);
        assert_eq!(ids(&result.missing_optional), vec!["excel"]);
    }
}
