use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static RE_PARENTHESIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").unwrap());
static RE_NON_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\s]").unwrap());

// French elided articles and pronouns: d'équipe, l'organisation, qu'il
static RE_ELISION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:c|d|j|l|m|n|qu|s|t)'").unwrap());

/// Characters ignored when building a compact lookup key.
const COMPACT_SEPARATORS: &[char] = &[
    ' ', '\u{3000}', '.', '-', '_', '/', '・', ',', '\'', '\u{2019}',
];

/// NFKC + lowercase + whitespace collapse.
///
/// Non-breaking spaces and full-width variants fold to their ASCII forms
/// before whitespace is collapsed, so `"Power\u{a0}BI"` and `"power  bi"`
/// normalize identically. Typographic apostrophes fold to `'`.
/// Returns an empty string for blank input.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .nfkc()
        .map(|c| if c == '\u{2019}' { '\'' } else { c })
        .collect::<String>()
        .to_lowercase();
    RE_WHITESPACE.replace_all(folded.trim(), " ").into_owned()
}

/// Drops French elisions from already normalized text (`d'autonomie` -> `autonomie`).
pub fn strip_elisions(normalized: &str) -> String {
    RE_ELISION.replace_all(normalized, "").into_owned()
}

/// Job title key: parenthesized qualifiers and non-letters dropped.
///
/// `"Data Analyst (H/F) - CDI"` and `"data analyst cdi"` share a key.
pub fn normalize_title(title: &str) -> String {
    let lowered = normalize_text(title);
    let without_qualifiers = RE_PARENTHESIZED.replace_all(&lowered, " ");
    let letters_only = RE_NON_LETTER.replace_all(&without_qualifiers, " ");
    RE_WHITESPACE.replace_all(letters_only.trim(), " ").into_owned()
}

/// Lookup key with separators removed (`node.js`, `node js` and `nodejs` share a key).
pub fn compact_key(text: &str) -> String {
    text.nfkc()
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| !COMPACT_SEPARATORS.contains(c) && !c.is_whitespace())
        .collect()
}

/// Full SHA-256 digest of the normalized text.
///
/// Texts differing only in case or spacing share a digest.
pub fn content_digest(text: &str) -> [u8; 32] {
    let normalized = normalize_text(text);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// First 16 hex characters of [`content_digest`], for log lines.
pub fn content_hash(text: &str) -> String {
    content_digest(text)[..8]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_case_and_spacing() {
        assert_eq!(normalize_text("  Data\t\tEngineer \n Python "), "data engineer python");
        assert_eq!(normalize_text("Power\u{a0}BI"), "power bi");
        assert_eq!(normalize_text("ＡＷＳ"), "aws");
        assert_eq!(normalize_text("Esprit d\u{2019}équipe"), "esprit d'équipe");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn strip_elisions_keeps_english_contractions() {
        assert_eq!(strip_elisions("d'autonomie"), "autonomie");
        assert_eq!(strip_elisions("sens de l'organisation"), "sens de organisation");
        assert_eq!(strip_elisions("don't"), "don't");
    }

    #[test]
    fn normalize_title_drops_qualifiers() {
        assert_eq!(normalize_title("Data Analyst (H/F) - CDI"), "data analyst cdi");
        assert_eq!(normalize_title("Ingénieur Data 2024"), "ingénieur data");
        assert_eq!(normalize_title("(stage)"), "");
    }

    #[test]
    fn compact_key_drops_separators() {
        assert_eq!(compact_key("Node.js"), "nodejs");
        assert_eq!(compact_key("node js"), "nodejs");
        assert_eq!(compact_key("CI/CD"), "cicd");
        assert_eq!(compact_key("C++"), "c++");
        assert_eq!(compact_key("C#"), "c#");
    }

    #[test]
    fn content_hash_ignores_case_and_whitespace() {
        let a = content_hash("Senior Rust  Engineer");
        let b = content_hash("senior rust engineer");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, content_hash("senior go engineer"));
    }

    #[test]
    fn short_hash_is_a_prefix_of_the_full_digest() {
        let digest = content_digest("Senior Rust Engineer");
        let full: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        assert_eq!(full.len(), 64);
        assert!(full.starts_with(&content_hash("senior rust  engineer")));
    }
}
