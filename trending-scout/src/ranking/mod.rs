//! Result aggregation and ranking.
//!
//! Merges the pages of every query of a discovery run, decodes each record,
//! collapses duplicate identifiers, scores the survivors and sorts them into
//! a [`RankedResultSet`]. Never fails: undecodable records are skipped and
//! counted.

mod result_set;

pub use result_set::{RankedResultSet, ScoredRepository};

use crate::fetch::QueryFetch;
use crate::repository::RepositorySummary;
use crate::scoring::Scorer;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Output of [`aggregate`].
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub results: RankedResultSet,

    /// Records that could not be decoded.
    pub skipped: usize,

    /// Records dropped because their identifier was already present.
    pub duplicates: usize,
}

/// Aggregates fetched queries into a ranked set.
///
/// Duplicate identifiers are matched ignoring ASCII case. The instance with
/// the higher score is kept; on an exact tie the later observation wins, as
/// it carries the freshest counts.
#[must_use]
pub fn aggregate<'a, I>(fetches: I, now: DateTime<Utc>, scorer: &Scorer) -> Aggregation
where
    I: IntoIterator<Item = &'a QueryFetch>,
{
    let mut best: HashMap<String, ScoredRepository> = HashMap::new();
    let mut skipped = 0;
    let mut duplicates = 0;

    for fetch in fetches {
        for record in fetch.records() {
            let repository = match RepositorySummary::from_record(record) {
                Ok(repository) => repository,
                Err(e) => {
                    debug!(origin = %fetch.origin, error = %e, "Skipping malformed record");
                    skipped += 1;
                    continue;
                }
            };

            let candidate = ScoredRepository {
                score: scorer.score(&repository, now),
                repository,
                origin: fetch.origin.clone(),
            };
            let key = candidate.full_name().to_ascii_lowercase();

            let keep = match best.get(&key) {
                Some(existing) => {
                    duplicates += 1;
                    candidate.score >= existing.score
                }
                None => true,
            };
            if keep {
                best.insert(key, candidate);
            }
        }
    }

    Aggregation {
        results: RankedResultSet::from_unique(best.into_values().collect()),
        skipped,
        duplicates,
    }
}
