use crate::normalize::{normalize_text, strip_elisions};

/// Weighted feature fed to the hashing provider.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedToken {
    pub token: String,
    pub weight: f32,
}

impl WeightedToken {
    pub fn new(token: impl Into<String>, weight: f32) -> Self {
        Self {
            token: token.into(),
            weight,
        }
    }
}

const WORD_WEIGHT: f32 = 1.0;
const BIGRAM_WEIGHT: f32 = 0.5;
const TRIGRAM_WEIGHT: f32 = 0.3;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "at", "au", "aux", "avec", "by", "dans", "de", "des", "du", "en", "et",
    "for", "in", "is", "la", "le", "les", "of", "on", "ou", "or", "par", "pour", "sur", "the",
    "to", "un", "une", "with",
];

/// Feature kinds:
/// - w:<word>          (word, weight 1.0)
/// - b:<word> <word>   (adjacent word pair, weight 0.5)
/// - c:<chars>         (character trigram of words of 4+ chars, weight 0.3)
///
/// Stopwords are dropped before pairs are formed.
pub fn tokenize_text(text: &str) -> Vec<WeightedToken> {
    let normalized = strip_elisions(&normalize_text(text));
    let words: Vec<&str> = normalized
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|word| !word.is_empty() && !STOPWORDS.contains(word))
        .collect();

    let mut tokens = Vec::with_capacity(words.len() * 4);
    for word in &words {
        tokens.push(WeightedToken::new(format!("w:{word}"), WORD_WEIGHT));
    }
    for pair in words.windows(2) {
        tokens.push(WeightedToken::new(
            format!("b:{} {}", pair[0], pair[1]),
            BIGRAM_WEIGHT,
        ));
    }
    for word in &words {
        let chars: Vec<char> = format!("^{word}$").chars().collect();
        if chars.len() < 6 {
            continue;
        }
        for gram in chars.windows(3) {
            tokens.push(WeightedToken::new(
                format!("c:{}", gram.iter().collect::<String>()),
                TRIGRAM_WEIGHT,
            ));
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(text: &str) -> Vec<String> {
        tokenize_text(text).into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn words_pairs_and_trigrams() {
        let tokens = features("Data pipelines");
        assert!(tokens.contains(&"w:data".to_string()));
        assert!(tokens.contains(&"w:pipelines".to_string()));
        assert!(tokens.contains(&"b:data pipelines".to_string()));
        assert!(tokens.contains(&"c:^da".to_string()));
        assert!(tokens.contains(&"c:es$".to_string()));
    }

    #[test]
    fn stopwords_and_elisions_are_skipped() {
        let tokens = features("Analyse de données et d'impact");
        assert!(tokens.contains(&"b:données impact".to_string()));
        assert!(!tokens.iter().any(|t| t == "w:de" || t == "w:et" || t == "w:d"));
    }

    #[test]
    fn short_words_have_no_trigrams() {
        let tokens = tokenize_text("C++ SQL");
        assert!(tokens.iter().all(|t| !t.token.starts_with("c:")));
        assert_eq!(tokens[0], WeightedToken::new("w:c++", 1.0));
    }

    #[test]
    fn blank_text_has_no_features() {
        assert!(tokenize_text("  \n ").is_empty());
    }
}
