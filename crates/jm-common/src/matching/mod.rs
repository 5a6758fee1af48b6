pub mod lexical;
pub mod pipeline;
pub mod scoring;
pub mod semantic;
pub mod weights;

pub use lexical::{lexical_score, LexicalMatch};
pub use pipeline::{MatchRun, MatchingEngine};
pub use scoring::{
    combine_scores, rank_results, CandidateView, MatchResult, Scorer, ScorerConfig, ScoringMode,
};
pub use semantic::{NearMatch, RelatedTitle, SemanticMatcher};
pub use weights::{LexicalWeights, ScoreWeights, DEFAULT_SCORE_WEIGHTS, LEXICAL_ONLY};
