use serde::{Deserialize, Serialize};

/// Caller default for the global score: skill overlap dominates, text
/// similarity refines.
pub const DEFAULT_SCORE_WEIGHTS: ScoreWeights = ScoreWeights {
    lexical: 0.8,
    semantic: 0.2,
};

/// Lexical-only weighting, used when the semantic signal is missing.
pub const LEXICAL_ONLY: ScoreWeights = ScoreWeights {
    lexical: 1.0,
    semantic: 0.0,
};

/// Split of the global score between lexical and semantic signals.
///
/// Any values are accepted; [`ScoreWeights::normalized`] turns them into a
/// pair in [0, 1] that sums to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub lexical: f64,
    pub semantic: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        DEFAULT_SCORE_WEIGHTS
    }
}

impl ScoreWeights {
    pub fn new(lexical: f64, semantic: f64) -> Self {
        Self { lexical, semantic }
    }

    /// Clamp each weight to [0, 1] (NaN counts as 0), then scale to sum 1.
    /// Both zero yields [`LEXICAL_ONLY`].
    pub fn normalized(&self) -> ScoreWeights {
        let lexical = clamp_weight(self.lexical);
        let semantic = clamp_weight(self.semantic);
        let sum = lexical + semantic;

        if sum <= f64::EPSILON {
            return LEXICAL_ONLY;
        }

        ScoreWeights {
            lexical: lexical / sum,
            semantic: semantic / sum,
        }
    }

    pub fn sum(&self) -> f64 {
        self.lexical + self.semantic
    }
}

/// Required vs. optional coverage inside the lexical score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LexicalWeights {
    pub required: f64,
    pub optional: f64,
}

impl Default for LexicalWeights {
    fn default() -> Self {
        Self {
            required: 0.7,
            optional: 0.3,
        }
    }
}

impl LexicalWeights {
    /// Same rules as [`ScoreWeights::normalized`]; both zero falls back to the default split.
    pub fn normalized(&self) -> LexicalWeights {
        let required = clamp_weight(self.required);
        let optional = clamp_weight(self.optional);
        let sum = required + optional;

        if sum <= f64::EPSILON {
            return LexicalWeights::default();
        }

        LexicalWeights {
            required: required / sum,
            optional: optional / sum,
        }
    }
}

fn clamp_weight(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
