use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::normalize_text;
use crate::taxonomy::{LookupMode, SkillCategory, SkillId, SkillTerm, Taxonomy};
use crate::{CandidateProfile, Posting};

// Phrase boundaries: n-gram windows never span one of these.
static PHRASE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;|()\[\]{}:!?\n\r•·]|\.(?:\s|$)").unwrap());

// Tokens keep the punctuation skill names carry: c++, c#, node.js, .net, ci/cd, d'analyse
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.?[\p{L}\p{N}][\p{L}\p{N}+#.\-_'\u{2019}/]*").unwrap());

const TOKEN_TRAILING: &[char] = &['.', '-', '_', '\'', '\u{2019}', '/'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementLevel {
    Required,
    Optional,
    Possessed,
}

/// Which region of which document is being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionRole {
    PostingRequired,
    PostingOptional,
    Candidate,
}

impl ExtractionRole {
    pub fn level(self) -> RequirementLevel {
        match self {
            ExtractionRole::PostingRequired => RequirementLevel::Required,
            ExtractionRole::PostingOptional => RequirementLevel::Optional,
            ExtractionRole::Candidate => RequirementLevel::Possessed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMention {
    pub term: Arc<SkillTerm>,
    pub level: RequirementLevel,
}

impl SkillMention {
    pub fn new(term: Arc<SkillTerm>, level: RequirementLevel) -> Self {
        Self { term, level }
    }

    pub fn id(&self) -> &SkillId {
        &self.term.id
    }

    pub fn category(&self) -> SkillCategory {
        self.term.category
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Longest phrase window tried, in tokens.
    pub max_ngram: usize,
    pub lookup: LookupMode,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_ngram: 4,
            lookup: LookupMode::Exact,
        }
    }
}

/// Mentions plus the normalized tokens that matched no taxonomy entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
    pub mentions: Vec<SkillMention>,
    pub unmatched: Vec<String>,
}

/// Skills derived from a candidate profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandidateSkills {
    pub mentions: Vec<SkillMention>,
    /// Explicit skill entries that resolved to nothing.
    pub unknown_explicit: Vec<String>,
}

impl CandidateSkills {
    pub fn ids(&self) -> HashSet<&SkillId> {
        self.mentions.iter().map(SkillMention::id).collect()
    }
}

pub struct SkillExtractor {
    taxonomy: Arc<Taxonomy>,
    config: ExtractorConfig,
}

impl SkillExtractor {
    pub fn new(taxonomy: Arc<Taxonomy>, config: ExtractorConfig) -> Self {
        let mut config = config;
        config.max_ngram = config.max_ngram.max(1);
        Self { taxonomy, config }
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    /// Canonical skills found in `text`, in first-occurrence order, one mention per term.
    pub fn extract(&self, text: &str, role: ExtractionRole) -> Vec<SkillMention> {
        self.extract_with_diagnostics(text, role).mentions
    }

    pub fn extract_with_diagnostics(&self, text: &str, role: ExtractionRole) -> Extraction {
        let level = role.level();
        let mut seen: HashSet<SkillId> = HashSet::new();
        let mut extraction = Extraction::default();

        for phrase in PHRASE_BREAK_RE.split(text) {
            let tokens = self.tokenize_phrase(phrase);
            let mut i = 0;
            while i < tokens.len() {
                let widest = self.config.max_ngram.min(tokens.len() - i);
                let found = (1..=widest).rev().find_map(|n| {
                    let window = tokens[i..i + n].join(" ");
                    self.taxonomy
                        .lookup(&window, self.config.lookup)
                        .map(|term| (Arc::clone(term), n))
                });

                match found {
                    Some((term, width)) => {
                        if seen.insert(term.id.clone()) {
                            extraction.mentions.push(SkillMention::new(term, level));
                        }
                        i += width;
                    }
                    None => {
                        extraction.unmatched.push(normalize_text(tokens[i]));
                        i += 1;
                    }
                }
            }
        }

        extraction
    }

    /// Required region first, then optional skills not already required.
    pub fn extract_posting(&self, required_text: &str, optional_text: &str) -> Vec<SkillMention> {
        let mut mentions = self.extract(required_text, ExtractionRole::PostingRequired);
        let required: HashSet<SkillId> = mentions.iter().map(|m| m.id().clone()).collect();

        mentions.extend(
            self.extract(optional_text, ExtractionRole::PostingOptional)
                .into_iter()
                .filter(|m| !required.contains(m.id())),
        );
        mentions
    }

    pub fn enrich(&self, posting: &mut Posting) {
        let mentions = self.extract_posting(&posting.required_text, &posting.optional_text);
        debug!(
            posting_id = posting.id.as_deref().unwrap_or("-"),
            source = %posting.source,
            skills = mentions.len(),
            "posting enriched"
        );
        posting.skills = Some(mentions);
    }

    /// Skills already attached by [`SkillExtractor::enrich`], or extracted now.
    pub fn posting_skills(&self, posting: &Posting) -> Vec<SkillMention> {
        match &posting.skills {
            Some(mentions) => mentions.clone(),
            None => self.extract_posting(&posting.required_text, &posting.optional_text),
        }
    }

    /// CV text mentions first, then explicit entries not yet seen.
    ///
    /// Explicit entries are looked up as a whole (typo-tolerant only when the
    /// extractor is configured so); an entry that does not resolve is scanned
    /// as text ("Python / Django").
    pub fn extract_candidate(&self, profile: &CandidateProfile) -> CandidateSkills {
        let mut mentions = self.extract(&profile.cv_text, ExtractionRole::Candidate);
        let mut seen: HashSet<SkillId> = mentions.iter().map(|m| m.id().clone()).collect();
        let mut unknown_explicit = Vec::new();

        for entry in &profile.skills {
            if entry.trim().is_empty() {
                continue;
            }

            let resolved = match self.taxonomy.lookup(entry, self.config.lookup) {
                Some(term) => vec![SkillMention::new(Arc::clone(term), RequirementLevel::Possessed)],
                None => self.extract(entry, ExtractionRole::Candidate),
            };

            if resolved.is_empty() {
                unknown_explicit.push(entry.trim().to_string());
                continue;
            }

            for mention in resolved {
                if seen.insert(mention.id().clone()) {
                    mentions.push(mention);
                }
            }
        }

        CandidateSkills {
            mentions,
            unknown_explicit,
        }
    }

    /// A slash-joined token ("python/django") is split unless the whole token
    /// is itself a known skill ("ci/cd").
    fn tokenize_phrase<'t>(&self, phrase: &'t str) -> Vec<&'t str> {
        let mut tokens = Vec::new();
        for found in TOKEN_RE.find_iter(phrase) {
            let token = found.as_str().trim_end_matches(TOKEN_TRAILING);
            if token.is_empty() {
                continue;
            }

            if token.contains('/') && self.taxonomy.lookup(token, self.config.lookup).is_none() {
                tokens.extend(
                    token
                        .split('/')
                        .map(|part| part.trim_end_matches(TOKEN_TRAILING))
                        .filter(|part| !part.is_empty()),
                );
            } else {
                tokens.push(token);
            }
        }
        tokens
    }
}
