//! Batch-level market figures that sit next to the skill report: how many
//! postings state a salary and how those salaries are spread, plus the most
//! frequent locations and contract types.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::normalize::normalize_text;
use crate::{Posting, SalaryRange};

/// Entries per list in [`summarize`] when the caller has no preference.
pub const DEFAULT_TOP_VALUES: usize = 20;

/// Legal monthly working hours in France (35 h/week).
const HOURS_PER_MONTH: f64 = 151.67;
/// Monthly and annual amounts below this are counts ("12 mois", "13e mois"), not money.
const MIN_PERIODIC_AMOUNT: f64 = 100.0;

// digit groups split by a space: "45 000", "1 200 000"
static RE_THOUSANDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)[ \u{a0}\u{202f}](\d{3})\b").unwrap());
static RE_AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*(k\b|k€)?").unwrap());
static RE_HOURLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"horaire|/\s*h\b|par heure|per hour|hourly|de l'heure").unwrap());
// checked before the monthly pattern: annual offers often end in "sur 12 mois"
static RE_ANNUAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"annuel|annual|par an\b|per year|yearly|/\s*an\b").unwrap());
static RE_MONTHLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"mois|mensuel|month|/\s*m\b").unwrap());

/// Words that signal a salary is mentioned even when no amount can be read.
const SALARY_MARKERS: &[&str] = &[
    "€", "eur", "euro", "k€", "rémunération", "salaire", "salary", "package", "brut", "net",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryPeriod {
    Hourly,
    Monthly,
    Annual,
}

impl SalaryPeriod {
    fn detect(normalized: &str) -> Self {
        if RE_HOURLY.is_match(normalized) {
            SalaryPeriod::Hourly
        } else if RE_ANNUAL.is_match(normalized) {
            SalaryPeriod::Annual
        } else if RE_MONTHLY.is_match(normalized) {
            SalaryPeriod::Monthly
        } else {
            SalaryPeriod::Annual
        }
    }

    fn to_annual(self, amount: f64) -> f64 {
        match self {
            SalaryPeriod::Hourly => amount * HOURS_PER_MONTH * 12.0,
            SalaryPeriod::Monthly => amount * 12.0,
            SalaryPeriod::Annual => amount,
        }
    }
}

/// Reads an annual salary range out of free salary text.
///
/// "Mensuel de 2500 à 3000 Euros" gives 30000..36000, "45k€ - 55k€" gives
/// 45000..55000, "Horaire de 12.5 Euros" is annualized over 151.67 h/month.
/// A single amount yields `min == max`. `None` when no amount is found.
pub fn parse_salary(text: &str) -> Option<SalaryRange> {
    let mut normalized = normalize_text(text);
    loop {
        let joined = RE_THOUSANDS.replace_all(&normalized, "$1$2").into_owned();
        if joined == normalized {
            break;
        }
        normalized = joined;
    }

    let period = SalaryPeriod::detect(&normalized);
    let amounts: Vec<f64> = RE_AMOUNT
        .captures_iter(&normalized)
        .filter_map(|caps| {
            let value: f64 = caps.get(1)?.as_str().replace(',', ".").parse().ok()?;
            let value = if caps.get(2).is_some() { value * 1000.0 } else { value };
            Some(value)
        })
        .filter(|value| period == SalaryPeriod::Hourly || *value >= MIN_PERIODIC_AMOUNT)
        .collect();

    let min = amounts.iter().copied().reduce(f64::min)?;
    let max = amounts.iter().copied().reduce(f64::max)?;
    Some(SalaryRange {
        min: Some(period.to_annual(min)),
        max: Some(period.to_annual(max)),
    })
}

/// True when the text talks about pay at all, amount or not.
pub fn mentions_salary(text: &str) -> bool {
    let normalized = normalize_text(text);
    SALARY_MARKERS
        .iter()
        .any(|marker| normalized.contains(marker))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalaryDistribution {
    pub min: f64,
    pub median: f64,
    pub max: f64,
    /// Range bounds pooled into the distribution (two per full range).
    pub values: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalarySummary {
    pub total_postings: usize,
    /// Postings with a readable range or at least a salary mention.
    pub with_salary: usize,
    pub share_with_salary: f64,
    /// `None` when no posting carries an amount.
    pub distribution: Option<SalaryDistribution>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub salary: SalarySummary,
    pub locations: Vec<ValueCount>,
    pub contract_types: Vec<ValueCount>,
}

/// Salary coverage plus the `top_n` most frequent locations and contract types.
pub fn summarize(postings: &[Posting], top_n: usize) -> MarketSummary {
    MarketSummary {
        salary: salary_summary(postings),
        locations: top_values(postings.iter().map(|p| p.location.as_deref()), top_n),
        contract_types: top_values(postings.iter().map(|p| p.contract_type.as_deref()), top_n),
    }
}

pub fn salary_summary(postings: &[Posting]) -> SalarySummary {
    let mut with_salary = 0;
    let mut values: Vec<f64> = Vec::new();

    for posting in postings {
        let range = posting.salary_range();
        let bounds: Vec<f64> = range
            .iter()
            .flat_map(|r| [r.min, r.max])
            .flatten()
            .filter(|v| v.is_finite())
            .collect();

        let mentioned = posting
            .salary_text
            .as_deref()
            .is_some_and(mentions_salary);
        if !bounds.is_empty() || mentioned {
            with_salary += 1;
        }
        values.extend(bounds);
    }

    let total = postings.len();
    SalarySummary {
        total_postings: total,
        with_salary,
        share_with_salary: if total == 0 {
            0.0
        } else {
            with_salary as f64 / total as f64
        },
        distribution: distribution(values),
    }
}

fn distribution(mut values: Vec<f64>) -> Option<SalaryDistribution> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let mid = values.len() / 2;
    let median = if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };
    Some(SalaryDistribution {
        min: values[0],
        median,
        max: values[values.len() - 1],
        values: values.len(),
    })
}

/// Counts values case- and spacing-insensitively, keeping the first spelling
/// seen. Most frequent first, then alphabetical.
pub fn top_values<'a, I>(values: I, top_n: usize) -> Vec<ValueCount>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts: HashMap<String, ValueCount> = HashMap::new();
    for raw in values.into_iter().flatten() {
        let key = normalize_text(raw);
        if key.is_empty() {
            continue;
        }
        counts
            .entry(key)
            .or_insert_with(|| ValueCount {
                value: raw.trim().to_string(),
                count: 0,
            })
            .count += 1;
    }

    let mut ranked: Vec<ValueCount> = counts.into_values().collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    ranked.truncate(top_n);
    ranked
}
