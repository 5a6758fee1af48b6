pub mod config;
pub mod corpus;
pub mod embedding;
pub mod extraction;
pub mod logging;
pub mod market;
pub mod matching;
pub mod normalize;
pub mod run_id;
pub mod taxonomy;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use extraction::{RequirementLevel, SkillMention};

pub use config::EngineConfig;
pub use corpus::{EmergentSkillReport, TrendConfig, TrendDirection};
pub use embedding::{EmbeddingError, EmbeddingProvider};
pub use extraction::SkillExtractor;
pub use matching::{MatchResult, MatchingEngine, ScoreWeights, ScoringMode};
pub use taxonomy::{SkillCategory, SkillId, SkillTerm, Taxonomy};

/// Salary bounds as supplied by the caller, or annual amounts read from the
/// posting's salary text by [`market::parse_salary`]. No currency conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// One job posting from a source connector.
///
/// `skills` stays `None` until [`SkillExtractor::enrich`] runs; it is never
/// read from or written to JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub body: String,
    /// "Must-have" region, however the source delineates it.
    #[serde(default)]
    pub required_text: String,
    /// "Nice-to-have" region.
    #[serde(default)]
    pub optional_text: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub salary: Option<SalaryRange>,
    /// Salary as the source words it ("Mensuel de 2500 à 3000 Euros").
    #[serde(default)]
    pub salary_text: Option<String>,
    #[serde(default)]
    pub published_on: Option<NaiveDate>,
    #[serde(skip)]
    pub skills: Option<Vec<SkillMention>>,
}

impl Posting {
    pub fn is_enriched(&self) -> bool {
        self.skills.is_some()
    }

    /// Attached mentions at `level`; empty before enrichment.
    pub fn mentions(&self, level: RequirementLevel) -> impl Iterator<Item = &SkillMention> {
        self.skills
            .iter()
            .flatten()
            .filter(move |mention| mention.level == level)
    }

    /// Structured salary when given, otherwise whatever the salary text yields.
    pub fn salary_range(&self) -> Option<SalaryRange> {
        self.salary
            .filter(|range| range.min.is_some() || range.max.is_some())
            .or_else(|| self.salary_text.as_deref().and_then(market::parse_salary))
    }

    /// Text embedded for semantic matching: title, body and both skill regions.
    pub fn semantic_text(&self) -> String {
        [
            self.title.as_deref().unwrap_or_default(),
            self.body.as_str(),
            self.required_text.as_str(),
            self.optional_text.as_str(),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
    }
}

/// A candidate: CV text plus an optional explicit skill list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub cv_text: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl CandidateProfile {
    /// CV text followed by the explicit skill list, so a profile with only a
    /// skill list still has something to embed.
    pub fn semantic_text(&self) -> String {
        let skills = self
            .skills
            .iter()
            .map(|skill| skill.trim())
            .filter(|skill| !skill.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        [self.cv_text.trim(), skills.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posting_deserializes_without_optional_fields() {
        let posting: Posting = serde_json::from_str(
            r#"{"source": "wttj", "required_text": "Python, SQL", "published_on": "2024-03-01"}"#,
        )
        .unwrap();

        assert_eq!(posting.source, "wttj");
        assert_eq!(posting.required_text, "Python, SQL");
        assert!(posting.optional_text.is_empty());
        assert_eq!(posting.published_on, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(!posting.is_enriched());
        assert_eq!(posting.mentions(RequirementLevel::Required).count(), 0);
    }

    #[test]
    fn structured_salary_wins_over_salary_text() {
        let mut posting = Posting {
            source: "france_travail".into(),
            salary_text: Some("Mensuel de 2000 Euros".into()),
            ..Posting::default()
        };
        assert_eq!(
            posting.salary_range(),
            Some(SalaryRange {
                min: Some(24000.0),
                max: Some(24000.0)
            })
        );

        posting.salary = Some(SalaryRange {
            min: Some(30000.0),
            max: None,
        });
        assert_eq!(posting.salary_range().and_then(|r| r.min), Some(30000.0));

        posting.salary = Some(SalaryRange::default());
        assert_eq!(posting.salary_range().and_then(|r| r.min), Some(24000.0));
    }

    #[test]
    fn semantic_text_skips_blank_parts() {
        let posting = Posting {
            source: "france_travail".into(),
            title: Some("Data Engineer".into()),
            body: "  ".into(),
            required_text: "Spark".into(),
            optional_text: "Airflow".into(),
            ..Posting::default()
        };
        assert_eq!(posting.semantic_text(), "Data Engineer\nSpark\nAirflow");
    }

    #[test]
    fn candidate_text_appends_explicit_skills() {
        let profile = CandidateProfile {
            cv_text: " Data analyst ".into(),
            skills: vec!["SQL".into(), " ".into(), "Tableau".into()],
        };
        assert_eq!(profile.semantic_text(), "Data analyst\nSQL, Tableau");

        let skills_only = CandidateProfile {
            skills: vec!["Rust".into()],
            ..CandidateProfile::default()
        };
        assert_eq!(skills_only.semantic_text(), "Rust");
    }
}
