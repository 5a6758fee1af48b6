use std::sync::Arc;

use proptest::prelude::*;

use jm_common::extraction::{RequirementLevel, SkillMention};
use jm_common::matching::{combine_scores, lexical_score, LexicalWeights, ScoreWeights};
use jm_common::taxonomy::{SkillCategory, SkillTerm};
use jm_common::{CandidateProfile, EngineConfig, MatchingEngine, Posting};

const SKILLS: &[&str] = &[
    "python", "sql", "rust", "docker", "kafka", "excel", "tableau", "communication",
];

fn mention(index: usize, level: RequirementLevel) -> SkillMention {
    let id = SKILLS[index % SKILLS.len()];
    SkillMention::new(
        Arc::new(SkillTerm::new(id, id, SkillCategory::Hard)),
        level,
    )
}

fn posting_skills(required: &[usize], optional: &[usize]) -> Vec<SkillMention> {
    let mut mentions: Vec<SkillMention> = Vec::new();
    for &i in required {
        let m = mention(i, RequirementLevel::Required);
        if !mentions.iter().any(|x| x.id() == m.id()) {
            mentions.push(m);
        }
    }
    for &i in optional {
        let m = mention(i, RequirementLevel::Optional);
        if !mentions.iter().any(|x| x.id() == m.id()) {
            mentions.push(m);
        }
    }
    mentions
}

fn possessed(indices: &[usize]) -> Vec<SkillMention> {
    indices
        .iter()
        .map(|&i| mention(i, RequirementLevel::Possessed))
        .collect()
}

fn skill_text(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|&i| SKILLS[i % SKILLS.len()])
        .collect::<Vec<_>>()
        .join(", ")
}

proptest! {
    #[test]
    fn lexical_score_is_bounded(
        required in prop::collection::vec(0usize..8, 0..6),
        optional in prop::collection::vec(0usize..8, 0..6),
        candidate in prop::collection::vec(0usize..8, 0..8),
        required_weight in -1.0f64..2.0,
        optional_weight in -1.0f64..2.0,
    ) {
        let weights = LexicalWeights { required: required_weight, optional: optional_weight };
        let result = lexical_score(&possessed(&candidate), &posting_skills(&required, &optional), &weights);
        prop_assert!((0.0..=1.0).contains(&result.score));
        if required.is_empty() && optional.is_empty() {
            prop_assert_eq!(result.score, 0.0);
        }
    }

    #[test]
    fn adding_a_possessed_required_skill_never_lowers_the_score(
        required in prop::collection::vec(0usize..8, 0..6),
        optional in prop::collection::vec(0usize..8, 0..6),
        candidate in prop::collection::vec(0usize..8, 0..8),
        extra in 0usize..8,
    ) {
        // moving a skill out of the optional region is a different change
        prop_assume!(!optional.contains(&extra));
        let mut candidate = candidate;
        candidate.push(extra);
        let weights = LexicalWeights::default();

        let before = lexical_score(&possessed(&candidate), &posting_skills(&required, &optional), &weights);
        let mut more_required = required.clone();
        more_required.push(extra);
        let after = lexical_score(&possessed(&candidate), &posting_skills(&more_required, &optional), &weights);

        prop_assert!(after.score + 1e-12 >= before.score, "{} < {}", after.score, before.score);
    }

    #[test]
    fn global_score_is_bounded_for_any_weights(
        lexical in 0.0f64..=1.0,
        semantic in proptest::option::of(0.0f64..=1.0),
        lexical_weight in -5.0f64..5.0,
        semantic_weight in -5.0f64..5.0,
    ) {
        let (global, applied) = combine_scores(lexical, semantic, &ScoreWeights::new(lexical_weight, semantic_weight));
        prop_assert!((0.0..=1.0).contains(&global));
        prop_assert!((applied.sum() - 1.0).abs() < 1e-9);
        if semantic.is_none() {
            prop_assert_eq!(global, lexical);
        }
    }

    #[test]
    fn weights_always_normalize_to_one(lexical in any::<f64>(), semantic in any::<f64>()) {
        let normalized = ScoreWeights::new(lexical, semantic).normalized();
        prop_assert!((0.0..=1.0).contains(&normalized.lexical));
        prop_assert!((0.0..=1.0).contains(&normalized.semantic));
        prop_assert!((normalized.sum() - 1.0).abs() < 1e-9);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn score_batch_is_idempotent(
        postings in prop::collection::vec(
            (prop::collection::vec(0usize..8, 0..4), prop::collection::vec(0usize..8, 0..3)),
            1..8,
        ),
        candidate in prop::collection::vec(0usize..8, 0..6),
        parallel in any::<bool>(),
    ) {
        let engine = MatchingEngine::from_config(EngineConfig { parallel, ..EngineConfig::default() });
        let postings: Vec<Posting> = postings
            .iter()
            .enumerate()
            .map(|(i, (required, optional))| Posting {
                id: Some(i.to_string()),
                source: "prop".into(),
                required_text: skill_text(required),
                optional_text: skill_text(optional),
                ..Posting::default()
            })
            .collect();
        let profile = CandidateProfile { cv_text: skill_text(&candidate), skills: vec![] };
        let weights = ScoreWeights::default();

        let first = engine.score_batch(&profile, &postings, &weights);
        let second = engine.score_batch(&profile, &postings, &weights);
        prop_assert_eq!(&first, &second);
        for result in &first {
            prop_assert!((0.0..=1.0).contains(&result.lexical_score));
            prop_assert!((0.0..=1.0).contains(&result.global_score));
            if let Some(semantic) = result.semantic_score {
                prop_assert!((0.0..=1.0).contains(&semantic));
            }
        }
    }
}
