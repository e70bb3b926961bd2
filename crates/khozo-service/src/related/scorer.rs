//! Weighted similarity between two opportunities.
//!
//! Each component is in `[0, 1]`; the weights sum to `1.0`, so the total
//! is too.

use std::collections::HashSet;

use khozo_entity::opportunity::{Eligibility, Opportunity};

const CATEGORY_WEIGHT: f64 = 0.30;
const KIND_WEIGHT: f64 = 0.10;
const TAG_WEIGHT: f64 = 0.30;
const TITLE_WEIGHT: f64 = 0.20;
const ELIGIBILITY_WEIGHT: f64 = 0.10;

/// Title words shorter than this are ignored.
const MIN_TITLE_WORD_CHARS: usize = 4;

/// Per-component similarity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    /// 1.0 when categories match.
    pub category: f64,
    /// 1.0 when kinds match.
    pub kind: f64,
    /// Jaccard index of the tag sets.
    pub tags: f64,
    /// Overlap of significant title words.
    pub title: f64,
    /// Agreement of the eligibility criteria both sides specify.
    pub eligibility: f64,
}

impl ScoreBreakdown {
    /// Weighted total, capped at 1.0.
    pub fn total(&self) -> f64 {
        let total = self.category * CATEGORY_WEIGHT
            + self.kind * KIND_WEIGHT
            + self.tags * TAG_WEIGHT
            + self.title * TITLE_WEIGHT
            + self.eligibility * ELIGIBILITY_WEIGHT;
        total.min(1.0)
    }

    /// Short human-readable explanation of the strongest signal.
    pub fn reason(&self) -> &'static str {
        if self.category >= 1.0 {
            "Same category"
        } else if self.tags > 0.0 {
            "Similar tags"
        } else if self.kind >= 1.0 {
            "Same type"
        } else {
            "Related opportunity"
        }
    }
}

/// Score `candidate` against `source`.
pub fn score(source: &Opportunity, candidate: &Opportunity) -> ScoreBreakdown {
    ScoreBreakdown {
        category: indicator(source.category == candidate.category),
        kind: indicator(source.kind == candidate.kind),
        tags: tag_similarity(&source.tags, &candidate.tags),
        title: title_similarity(&source.title, &candidate.title),
        eligibility: eligibility_similarity(&source.eligibility, &candidate.eligibility),
    }
}

fn indicator(matches: bool) -> f64 {
    if matches { 1.0 } else { 0.0 }
}

/// `|A ∩ B| / |A ∪ B|`; zero when either set is empty.
pub fn jaccard<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Case-insensitive Jaccard index of two tag lists.
pub fn tag_similarity(a: &[String], b: &[String]) -> f64 {
    let a: HashSet<String> = a.iter().map(|t| t.trim().to_lowercase()).collect();
    let b: HashSet<String> = b.iter().map(|t| t.trim().to_lowercase()).collect();
    jaccard(&a, &b)
}

/// Shared significant words over the larger word set.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = title_words(a);
    let b = title_words(b);
    let larger = a.len().max(b.len());
    if larger == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / larger as f64
}

fn title_words(title: &str) -> HashSet<String> {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_TITLE_WORD_CHARS)
        .map(str::to_lowercase)
        .collect()
}

/// Fraction of the criteria specified on both sides that are equal.
///
/// Text criteria compare case-insensitively. Zero when no criterion is
/// specified on both sides.
pub fn eligibility_similarity(a: &Eligibility, b: &Eligibility) -> f64 {
    let text = |x: &Option<String>, y: &Option<String>| match (x, y) {
        (Some(x), Some(y)) => Some(x.trim().eq_ignore_ascii_case(y.trim())),
        _ => None,
    };
    let number = |x: Option<u32>, y: Option<u32>| x.zip(y).map(|(x, y)| x == y);

    let compared: Vec<bool> = [
        text(&a.state, &b.state),
        number(a.age_min, b.age_min),
        number(a.age_max, b.age_max),
        text(&a.education, &b.education),
        text(&a.gender, &b.gender),
    ]
    .into_iter()
    .flatten()
    .collect();

    if compared.is_empty() {
        return 0.0;
    }
    let matched = compared.iter().filter(|equal| **equal).count();
    matched as f64 / compared.len() as f64
}
