//! Skill frequency statistics over posting batches and trend calls against a
//! reference window.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::extraction::{RequirementLevel, SkillMention};
use crate::taxonomy::{SkillCategory, SkillId, SkillTerm};
use crate::Posting;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Stable,
    Falling,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Relative change in share that separates rising/falling from stable (0.5 = 50%).
    pub relative_change: f64,
    /// Count a skill needs in the growing window before a trend is called.
    pub min_count: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            relative_change: 0.5,
            min_count: 2,
        }
    }
}

impl TrendConfig {
    /// Both counts are document frequencies; totals are batch sizes.
    pub fn classify(
        &self,
        current_count: usize,
        current_total: usize,
        reference_count: usize,
        reference_total: usize,
    ) -> TrendDirection {
        let factor = 1.0 + self.relative_change.max(0.0);
        let current_share = share(current_count, current_total);
        let reference_share = share(reference_count, reference_total);

        if current_count >= self.min_count && current_share > reference_share * factor {
            TrendDirection::Rising
        } else if reference_count >= self.min_count && reference_share > current_share * factor {
            TrendDirection::Falling
        } else {
            TrendDirection::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillFrequency {
    pub skill: SkillId,
    pub label: String,
    pub category: SkillCategory,
    /// Postings in the current batch mentioning the skill at any level.
    pub count: usize,
    pub required_count: usize,
    pub optional_count: usize,
    /// `count / total_postings`.
    pub share: f64,
    pub reference_count: Option<usize>,
    pub reference_share: Option<f64>,
    pub trend: TrendDirection,
}

/// Rebuilt from scratch on every aggregation; holds no state between calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmergentSkillReport {
    pub total_postings: usize,
    /// `None` when no usable reference window was supplied.
    pub reference_postings: Option<usize>,
    pub trend_config: TrendConfig,
    /// Current count descending, then reference count descending, then id.
    pub skills: Vec<SkillFrequency>,
}

impl EmergentSkillReport {
    pub fn get(&self, id: &SkillId) -> Option<&SkillFrequency> {
        self.skills.iter().find(|entry| &entry.skill == id)
    }

    pub fn with_trend(&self, trend: TrendDirection) -> impl Iterator<Item = &SkillFrequency> {
        self.skills.iter().filter(move |entry| entry.trend == trend)
    }

    pub fn rising(&self) -> impl Iterator<Item = &SkillFrequency> {
        self.with_trend(TrendDirection::Rising)
    }

    pub fn by_category(&self, category: SkillCategory) -> impl Iterator<Item = &SkillFrequency> {
        self.skills
            .iter()
            .filter(move |entry| entry.category == category)
    }

    /// Reference-free heuristic: skills required by between `min_share` and
    /// `max_share` of current postings (inclusive), most required first.
    pub fn emerging_by_share(&self, min_share: f64, max_share: f64) -> Vec<&SkillFrequency> {
        let mut emerging: Vec<&SkillFrequency> = self
            .skills
            .iter()
            .filter(|entry| {
                let required_share = share(entry.required_count, self.total_postings);
                entry.required_count > 0
                    && required_share >= min_share
                    && required_share <= max_share
            })
            .collect();
        emerging.sort_by(|a, b| {
            b.required_count
                .cmp(&a.required_count)
                .then_with(|| a.skill.cmp(&b.skill))
        });
        emerging
    }
}

#[derive(Default)]
struct Tally {
    term: Option<Arc<SkillTerm>>,
    count: usize,
    required: usize,
    optional: usize,
    reference: usize,
}

/// Counts every skill of the current batch and of the reference window.
///
/// Each slice holds one posting's mentions. A skill counts once per posting,
/// at its strongest level. Without a reference window, or with an empty one,
/// every trend is stable.
pub fn aggregate(
    current: &[Vec<SkillMention>],
    reference: Option<&[Vec<SkillMention>]>,
    config: &TrendConfig,
) -> EmergentSkillReport {
    let mut tallies: BTreeMap<SkillId, Tally> = BTreeMap::new();

    for mentions in current {
        for (term, level) in distinct_skills(mentions) {
            let tally = tallies.entry(term.id.clone()).or_default();
            tally.term.get_or_insert_with(|| Arc::clone(&term));
            tally.count += 1;
            match level {
                RequirementLevel::Required => tally.required += 1,
                RequirementLevel::Optional => tally.optional += 1,
                RequirementLevel::Possessed => {}
            }
        }
    }

    let reference = reference.filter(|batch| !batch.is_empty());
    if let Some(batch) = reference {
        for mentions in batch {
            for (term, _) in distinct_skills(mentions) {
                let tally = tallies.entry(term.id.clone()).or_default();
                tally.term.get_or_insert_with(|| Arc::clone(&term));
                tally.reference += 1;
            }
        }
    }

    let total = current.len();
    let reference_total = reference.map(<[_]>::len);

    let mut skills: Vec<SkillFrequency> = tallies
        .into_iter()
        .filter_map(|(id, tally)| {
            let term = tally.term?;
            let trend = match reference_total {
                Some(reference_total) => {
                    config.classify(tally.count, total, tally.reference, reference_total)
                }
                None => TrendDirection::Stable,
            };
            Some(SkillFrequency {
                skill: id,
                label: term.label.clone(),
                category: term.category,
                count: tally.count,
                required_count: tally.required,
                optional_count: tally.optional,
                share: share(tally.count, total),
                reference_count: reference_total.map(|_| tally.reference),
                reference_share: reference_total.map(|n| share(tally.reference, n)),
                trend,
            })
        })
        .collect();

    skills.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.reference_count.cmp(&a.reference_count))
            .then_with(|| a.skill.cmp(&b.skill))
    });

    EmergentSkillReport {
        total_postings: total,
        reference_postings: reference_total,
        trend_config: *config,
        skills,
    }
}

/// Splits a dated batch at `cutoff`: postings published before it form the
/// reference window, the rest (undated included) the current one.
pub fn split_by_date(postings: &[Posting], cutoff: NaiveDate) -> (Vec<Posting>, Vec<Posting>) {
    postings
        .iter()
        .cloned()
        .partition(|posting| posting.published_on.map_or(true, |date| date >= cutoff))
}

fn distinct_skills(mentions: &[SkillMention]) -> Vec<(Arc<SkillTerm>, RequirementLevel)> {
    let mut seen: HashSet<&SkillId> = HashSet::new();
    let mut distinct: Vec<(Arc<SkillTerm>, RequirementLevel)> = Vec::new();

    // required first so a skill at both levels is tallied as required
    let ordered = mentions
        .iter()
        .filter(|m| m.level == RequirementLevel::Required)
        .chain(mentions.iter().filter(|m| m.level != RequirementLevel::Required));
    for mention in ordered {
        if seen.insert(mention.id()) {
            distinct.push((Arc::clone(&mention.term), mention.level));
        }
    }
    distinct
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
