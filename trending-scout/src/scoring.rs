//! Trending score computation.
//!
//! ```text
//! base_popularity = stars*1.0 + forks*2.0 + watchers*1.5
//! activity        = open_issues*0.1 + (5 if has_wiki) + min(topics, cap)
//! score           = (base_popularity + activity) * recency(age_days) * language_boost
//! ```
//!
//! Scoring is a pure function of the repository snapshot, `now`, and the
//! configured tables.

use crate::repository::RepositorySummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default number of topics that contribute to the activity score.
pub const DEFAULT_TOPIC_CAP: usize = 5;

const STAR_WEIGHT: f64 = 1.0;
const FORK_WEIGHT: f64 = 2.0;
const WATCHER_WEIGHT: f64 = 1.5;
const ISSUE_WEIGHT: f64 = 0.1;
const WIKI_BONUS: f64 = 5.0;
const TOPIC_WEIGHT: f64 = 1.0;

/// Language boost applied when the language is missing or not in the table.
pub const DEFAULT_LANGUAGE_BOOST: f64 = 1.0;

/// Built-in language multipliers.
pub const DEFAULT_LANGUAGE_BOOSTS: [(&str, f64); 11] = [
    ("python", 1.2),
    ("rust", 1.2),
    ("typescript", 1.1),
    ("javascript", 1.1),
    ("go", 1.1),
    ("java", 1.0),
    ("c++", 1.0),
    ("c#", 0.9),
    ("swift", 0.9),
    ("kotlin", 0.9),
    ("php", 0.8),
];

/// Step function rewarding young repositories. Non-increasing in
/// `age_days`.
#[must_use]
pub fn recency_multiplier(age_days: i64) -> f64 {
    match age_days {
        ..=7 => 2.0,
        8..=30 => 1.5,
        31..=180 => 1.0,
        _ => 0.7,
    }
}

/// Whole days since creation, at least 1.
#[must_use]
pub fn age_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_days().max(1)
}

/// Tunable scoring tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ScoringConfig {
    /// Multiplier per language. Keys are matched case-insensitively.
    pub language_boosts: BTreeMap<String, f64>,

    /// Maximum number of topics counted.
    pub topic_cap: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            language_boosts: DEFAULT_LANGUAGE_BOOSTS
                .iter()
                .map(|(lang, boost)| ((*lang).to_string(), *boost))
                .collect(),
            topic_cap: DEFAULT_TOPIC_CAP,
        }
    }
}

/// Every intermediate term of a score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base_popularity: f64,
    pub activity: f64,
    pub age_days: i64,
    pub recency_multiplier: f64,
    pub language_boost: f64,
    pub total: f64,
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pop: {:.0}, Activity: {:.1}, Recency: {:.1}x, Lang: {:.1}x",
            self.base_popularity, self.activity, self.recency_multiplier, self.language_boost
        )
    }
}

/// Computes trending scores with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Scorer {
    boosts: BTreeMap<String, f64>,
    topic_cap: usize,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl Scorer {
    /// Creates a scorer. Language keys are lowercased; negative (including
    /// `-0.0`) or non-finite boosts are dropped so scores stay non-negative.
    #[must_use]
    pub fn new(config: &ScoringConfig) -> Self {
        let boosts = config
            .language_boosts
            .iter()
            .filter(|(_, boost)| boost.is_finite() && !boost.is_sign_negative())
            .map(|(lang, boost)| (lang.to_ascii_lowercase(), *boost))
            .collect();
        Self {
            boosts,
            topic_cap: config.topic_cap,
        }
    }

    /// Multiplier for `language`, or the default when unknown or missing.
    #[must_use]
    pub fn language_boost(&self, language: Option<&str>) -> f64 {
        language
            .and_then(|lang| self.boosts.get(&lang.to_ascii_lowercase()))
            .copied()
            .unwrap_or(DEFAULT_LANGUAGE_BOOST)
    }

    /// Computes the score of `repo` at `now`.
    #[must_use]
    pub fn score(&self, repo: &RepositorySummary, now: DateTime<Utc>) -> f64 {
        self.breakdown(repo, now).total
    }

    /// Computes the score of `repo` at `now` with every intermediate term.
    #[must_use]
    pub fn breakdown(&self, repo: &RepositorySummary, now: DateTime<Utc>) -> ScoreBreakdown {
        let count = |n: i64| n.max(0) as f64;

        let base_popularity = count(repo.stars) * STAR_WEIGHT
            + count(repo.forks) * FORK_WEIGHT
            + count(repo.watchers) * WATCHER_WEIGHT;

        let wiki = if repo.has_wiki { WIKI_BONUS } else { 0.0 };
        let topics = repo.topics.len().min(self.topic_cap) as f64;
        let activity = count(repo.open_issues) * ISSUE_WEIGHT + wiki + topics * TOPIC_WEIGHT;

        let age_days = age_days(repo.created_at, now);
        let recency_multiplier = recency_multiplier(age_days);
        let language_boost = self.language_boost(repo.language.as_deref());

        ScoreBreakdown {
            base_popularity,
            activity,
            age_days,
            recency_multiplier,
            language_boost,
            total: (base_popularity + activity) * recency_multiplier * language_boost,
        }
    }
}

/// Scores `repo` with the default tables.
#[must_use]
pub fn score(repo: &RepositorySummary, now: DateTime<Utc>) -> f64 {
    Scorer::default().score(repo, now)
}
