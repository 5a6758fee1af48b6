use std::str::FromStr;

use tracing::warn;

use crate::corpus::TrendConfig;
use crate::embedding::EmbeddingConfig;
use crate::extraction::ExtractorConfig;
use crate::matching::{LexicalWeights, ScoreWeights, ScorerConfig};
use crate::taxonomy::LookupMode;

/// Engine settings, read from `JM_*` environment variables.
///
/// | variable | default |
/// |---|---|
/// | `JM_MAX_NGRAM` | 4 |
/// | `JM_FUZZY_EXTRACTION` | false |
/// | `JM_LEXICAL_WEIGHT` / `JM_SEMANTIC_WEIGHT` | 0.8 / 0.2 |
/// | `JM_REQUIRED_WEIGHT` / `JM_OPTIONAL_WEIGHT` | 0.7 / 0.3 |
/// | `JM_MIN_GLOBAL_SCORE` | unset |
/// | `JM_NEAR_MATCH_THRESHOLD` | unset |
/// | `JM_PARALLEL` | true |
/// | `JM_TREND_RELATIVE_CHANGE` / `JM_TREND_MIN_COUNT` | 0.5 / 2 |
/// | `JM_EMBEDDER` / `JM_EMBEDDING_DIMENSION` | hash / 256 |
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub extractor: ExtractorConfig,
    /// Default weights for callers that do not pass their own.
    pub weights: ScoreWeights,
    pub scorer: ScorerConfig,
    /// Ranked results below this global score are dropped.
    pub min_global_score: Option<f64>,
    pub parallel: bool,
    pub trend: TrendConfig,
    pub embedding: EmbeddingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            weights: ScoreWeights::default(),
            scorer: ScorerConfig::default(),
            min_global_score: None,
            parallel: true,
            trend: TrendConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`EngineConfig::from_env`] over any name -> value source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let fuzzy = parse_var(&lookup, "JM_FUZZY_EXTRACTION", false);

        Self {
            extractor: ExtractorConfig {
                max_ngram: parse_var(&lookup, "JM_MAX_NGRAM", defaults.extractor.max_ngram).max(1),
                lookup: if fuzzy {
                    LookupMode::Tolerant
                } else {
                    LookupMode::Exact
                },
            },
            weights: ScoreWeights {
                lexical: parse_var(&lookup, "JM_LEXICAL_WEIGHT", defaults.weights.lexical),
                semantic: parse_var(&lookup, "JM_SEMANTIC_WEIGHT", defaults.weights.semantic),
            },
            scorer: ScorerConfig {
                lexical_weights: LexicalWeights {
                    required: parse_var(
                        &lookup,
                        "JM_REQUIRED_WEIGHT",
                        defaults.scorer.lexical_weights.required,
                    ),
                    optional: parse_var(
                        &lookup,
                        "JM_OPTIONAL_WEIGHT",
                        defaults.scorer.lexical_weights.optional,
                    ),
                },
                near_match_threshold: parse_optional_var(&lookup, "JM_NEAR_MATCH_THRESHOLD"),
            },
            min_global_score: parse_optional_var(&lookup, "JM_MIN_GLOBAL_SCORE"),
            parallel: parse_var(&lookup, "JM_PARALLEL", defaults.parallel),
            trend: TrendConfig {
                relative_change: parse_var(
                    &lookup,
                    "JM_TREND_RELATIVE_CHANGE",
                    defaults.trend.relative_change,
                ),
                min_count: parse_var(&lookup, "JM_TREND_MIN_COUNT", defaults.trend.min_count),
            },
            embedding: EmbeddingConfig {
                provider: lookup("JM_EMBEDDER")
                    .map(|value| value.trim().to_ascii_lowercase())
                    .filter(|value| !value.is_empty())
                    .unwrap_or(defaults.embedding.provider),
                dimension: parse_var(
                    &lookup,
                    "JM_EMBEDDING_DIMENSION",
                    defaults.embedding.dimension,
                ),
            },
        }
    }
}

trait EnvValue: Sized {
    fn parse_env(raw: &str) -> Option<Self>;
}

impl EnvValue for bool {
    fn parse_env(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }
}

macro_rules! env_value_from_str {
    ($($ty:ty),*) => {
        $(impl EnvValue for $ty {
            fn parse_env(raw: &str) -> Option<Self> {
                parse_trimmed(raw)
            }
        })*
    };
}

env_value_from_str!(f64, usize);

fn parse_trimmed<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: EnvValue,
{
    parse_optional_var(lookup, name).unwrap_or(default)
}

/// Unset or blank yields `None`; an unparsable value is logged and ignored.
fn parse_optional_var<F, T>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: EnvValue,
{
    let raw = lookup(name)?;
    if raw.trim().is_empty() {
        return None;
    }
    let parsed = T::parse_env(&raw);
    if parsed.is_none() {
        warn!(variable = name, value = %raw, "ignoring unparsable configuration value");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config(&[]), EngineConfig::default());
        let defaults = EngineConfig::default();
        assert_eq!(defaults.extractor.max_ngram, 4);
        assert_eq!(defaults.weights, ScoreWeights::new(0.8, 0.2));
        assert_eq!(defaults.embedding.provider, "hash");
    }

    #[test]
    fn reads_every_variable() {
        let cfg = config(&[
            ("JM_MAX_NGRAM", "2"),
            ("JM_FUZZY_EXTRACTION", "true"),
            ("JM_LEXICAL_WEIGHT", "0.5"),
            ("JM_SEMANTIC_WEIGHT", " 0.5 "),
            ("JM_REQUIRED_WEIGHT", "0.6"),
            ("JM_OPTIONAL_WEIGHT", "0.4"),
            ("JM_MIN_GLOBAL_SCORE", "0.4"),
            ("JM_NEAR_MATCH_THRESHOLD", "0.75"),
            ("JM_PARALLEL", "0"),
            ("JM_TREND_RELATIVE_CHANGE", "1.0"),
            ("JM_TREND_MIN_COUNT", "5"),
            ("JM_EMBEDDER", "None"),
            ("JM_EMBEDDING_DIMENSION", "64"),
        ]);

        assert_eq!(cfg.extractor.max_ngram, 2);
        assert_eq!(cfg.extractor.lookup, LookupMode::Tolerant);
        assert_eq!(cfg.weights, ScoreWeights::new(0.5, 0.5));
        assert_eq!(cfg.scorer.lexical_weights.required, 0.6);
        assert_eq!(cfg.scorer.lexical_weights.optional, 0.4);
        assert_eq!(cfg.min_global_score, Some(0.4));
        assert_eq!(cfg.scorer.near_match_threshold, Some(0.75));
        assert!(!cfg.parallel);
        assert_eq!(cfg.trend.relative_change, 1.0);
        assert_eq!(cfg.trend.min_count, 5);
        assert_eq!(cfg.embedding.provider, "none");
        assert_eq!(cfg.embedding.dimension, 64);
    }

    #[test]
    fn unparsable_values_fall_back() {
        let cfg = config(&[
            ("JM_MAX_NGRAM", "many"),
            ("JM_PARALLEL", "sometimes"),
            ("JM_MIN_GLOBAL_SCORE", "forty"),
            ("JM_NEAR_MATCH_THRESHOLD", ""),
        ]);
        assert_eq!(cfg.extractor.max_ngram, 4);
        assert!(cfg.parallel);
        assert_eq!(cfg.min_global_score, None);
        assert_eq!(cfg.scorer.near_match_threshold, None);
    }

    #[test]
    fn ngram_window_is_at_least_one() {
        assert_eq!(config(&[("JM_MAX_NGRAM", "0")]).extractor.max_ngram, 1);
    }
}
