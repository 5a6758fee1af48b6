//! Canonical skill taxonomy and the normalizer that maps raw tokens onto it.
//!
//! A [`Taxonomy`] is built once (from the built-in list or a caller-supplied
//! JSON list) and is read-only afterwards. Share it behind an `Arc`.

mod builtin;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strsim::damerau_levenshtein;
use thiserror::Error;
use tracing::{debug, warn};

use crate::normalize::{compact_key, normalize_text, strip_elisions};

/// Compact keys shorter than this are only reachable through exact lookups.
const MIN_COMPACT_KEY_LEN: usize = 4;
/// Inputs, aliases and ids shorter than this never take the typo-tolerant path.
const MIN_FUZZY_LEN: usize = 7;
/// Two edits are only tolerated from this length on; below it, one.
const MIN_TWO_EDIT_LEN: usize = 10;
/// Ids and labels made of fewer letters than this are not indexed implicitly.
const MIN_IMPLICIT_WORD_LEN: usize = 3;

fn is_short_bare_word(form: &str) -> bool {
    let normalized = normalize_text(form);
    normalized.chars().all(char::is_alphabetic)
        && normalized.chars().count() < MIN_IMPLICIT_WORD_LEN
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(String);

impl SkillId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SkillId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Hard,
    Soft,
    /// Spoken languages ("anglais courant"). Matched like any other skill.
    Language,
}

impl SkillCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::Hard => "hard",
            SkillCategory::Soft => "soft",
            SkillCategory::Language => "language",
        }
    }
}

/// One canonical taxonomy entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTerm {
    pub id: SkillId,
    pub label: String,
    pub category: SkillCategory,
    #[serde(default)]
    pub aliases: BTreeSet<String>,
}

impl SkillTerm {
    pub fn new(id: impl Into<String>, label: impl Into<String>, category: SkillCategory) -> Self {
        Self {
            id: SkillId::new(id),
            label: label.into(),
            category,
            aliases: BTreeSet::new(),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Every surface form that resolves to this term.
    ///
    /// Aliases are always indexed. The id and label are skipped when they are
    /// a bare word of fewer than [`MIN_IMPLICIT_WORD_LEN`] letters ("Go", "R"),
    /// so such terms are only reachable through their qualified aliases.
    fn surface_forms(&self) -> impl Iterator<Item = &str> {
        [self.id.as_str(), self.label.as_str()]
            .into_iter()
            .filter(|form| !is_short_bare_word(form))
            .chain(self.aliases.iter().map(String::as_str))
    }
}

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("taxonomy entry has an empty id")]
    EmptyId,

    #[error("taxonomy entry `{id}` has an empty label")]
    EmptyLabel { id: String },

    #[error("taxonomy entry `{id}` is defined more than once")]
    DuplicateTerm { id: String },

    #[error("malformed taxonomy JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How forgiving a lookup is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    /// Normalized alias or compact-key match only.
    #[default]
    Exact,
    /// Exact, then one or two edits on long tokens.
    Tolerant,
}

#[derive(Debug, Clone)]
pub struct Taxonomy {
    terms: Vec<Arc<SkillTerm>>,
    by_id: HashMap<SkillId, usize>,
    alias_index: HashMap<String, usize>,
    compact_index: HashMap<String, usize>,
    /// Sorted (compact key, term index) pairs scanned by the tolerant lookup.
    fuzzy_keys: Vec<(String, usize)>,
}

impl Taxonomy {
    /// The built-in English/French technical and soft-skill list.
    pub fn builtin() -> Self {
        match Self::from_terms(builtin::builtin_terms()) {
            Ok(taxonomy) => taxonomy,
            Err(err) => unreachable!("built-in taxonomy is invalid: {err}"),
        }
    }

    /// Parses `[{"id": .., "label": .., "category": "hard"|"soft"|"language", "aliases": [..]}]`.
    pub fn from_json_str(json: &str) -> Result<Self, TaxonomyError> {
        let terms: Vec<SkillTerm> = serde_json::from_str(json)?;
        Self::from_terms(terms)
    }

    pub fn from_terms<I>(terms: I) -> Result<Self, TaxonomyError>
    where
        I: IntoIterator<Item = SkillTerm>,
    {
        let mut taxonomy = Taxonomy {
            terms: Vec::new(),
            by_id: HashMap::new(),
            alias_index: HashMap::new(),
            compact_index: HashMap::new(),
            fuzzy_keys: Vec::new(),
        };

        for term in terms {
            taxonomy.insert(term)?;
        }

        let mut fuzzy_keys: Vec<(String, usize)> = taxonomy
            .compact_index
            .iter()
            .map(|(key, idx)| (key.clone(), *idx))
            .collect();
        fuzzy_keys.sort();
        taxonomy.fuzzy_keys = fuzzy_keys;

        debug!(
            terms = taxonomy.terms.len(),
            aliases = taxonomy.alias_index.len(),
            "taxonomy loaded"
        );
        Ok(taxonomy)
    }

    fn insert(&mut self, term: SkillTerm) -> Result<(), TaxonomyError> {
        let id = term.id.as_str().trim();
        if id.is_empty() {
            return Err(TaxonomyError::EmptyId);
        }
        if term.label.trim().is_empty() {
            return Err(TaxonomyError::EmptyLabel { id: id.to_string() });
        }
        if self.by_id.contains_key(&term.id) {
            return Err(TaxonomyError::DuplicateTerm { id: id.to_string() });
        }

        let idx = self.terms.len();
        for form in term.surface_forms() {
            let normalized = normalize_text(form);
            if normalized.is_empty() {
                continue;
            }
            let elided = strip_elisions(&normalized);
            if elided != normalized && !elided.trim().is_empty() {
                self.register_alias(elided, idx, &term);
            }
            self.register_alias(normalized, idx, &term);

            let compact = compact_key(form);
            if compact.chars().count() >= MIN_COMPACT_KEY_LEN {
                self.compact_index.entry(compact).or_insert(idx);
            }
        }

        self.by_id.insert(term.id.clone(), idx);
        self.terms.push(Arc::new(term));
        Ok(())
    }

    fn register_alias(&mut self, alias: String, idx: usize, term: &SkillTerm) {
        match self.alias_index.get(&alias) {
            Some(&existing) if existing != idx => {
                warn!(
                    alias = %alias,
                    kept = %self.terms[existing].id,
                    ignored = %term.id,
                    "alias claimed by two taxonomy terms; keeping the first"
                );
            }
            Some(_) => {}
            None => {
                self.alias_index.insert(alias, idx);
            }
        }
    }

    /// Case-insensitive, whitespace-normalized, alias-aware lookup.
    ///
    /// `None` means "not a tracked skill". Typo tolerance is opt-in through
    /// [`Taxonomy::lookup`] with [`LookupMode::Tolerant`].
    pub fn canonicalize(&self, raw: &str) -> Option<&Arc<SkillTerm>> {
        self.lookup(raw, LookupMode::Exact)
    }

    pub fn lookup(&self, raw: &str, mode: LookupMode) -> Option<&Arc<SkillTerm>> {
        let normalized = normalize_text(raw);
        if normalized.is_empty() {
            return None;
        }

        if let Some(&idx) = self.alias_index.get(&normalized) {
            return Some(&self.terms[idx]);
        }

        let elided = strip_elisions(&normalized);
        if elided != normalized {
            if let Some(&idx) = self.alias_index.get(&elided) {
                return Some(&self.terms[idx]);
            }
        }

        let compact = compact_key(&normalized);
        if compact.chars().count() >= MIN_COMPACT_KEY_LEN {
            if let Some(&idx) = self.compact_index.get(&compact) {
                return Some(&self.terms[idx]);
            }
        }

        match mode {
            LookupMode::Exact => None,
            LookupMode::Tolerant => self.fuzzy_match(&compact).map(|idx| &self.terms[idx]),
        }
    }

    fn fuzzy_match(&self, compact: &str) -> Option<usize> {
        let input_len = compact.chars().count();
        if input_len < MIN_FUZZY_LEN {
            return None;
        }

        let mut best: Option<(usize, usize)> = None;
        for (key, idx) in &self.fuzzy_keys {
            let key_len = key.chars().count();
            if key_len < MIN_FUZZY_LEN || self.terms[*idx].id.as_str().chars().count() < MIN_FUZZY_LEN
            {
                continue;
            }

            let distance = damerau_levenshtein(compact, key);
            let len = input_len.max(key_len);
            let acceptable = distance == 1 || (len >= MIN_TWO_EDIT_LEN && distance == 2);
            if !acceptable {
                continue;
            }

            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((*idx, distance)),
            }
        }

        best.map(|(idx, _)| idx)
    }

    pub fn get(&self, id: &SkillId) -> Option<&Arc<SkillTerm>> {
        self.by_id.get(id).map(|&idx| &self.terms[idx])
    }

    pub fn terms(&self) -> impl Iterator<Item = &Arc<SkillTerm>> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
