//! Discovery summary types.

use super::outcome::QueryOutcome;
use crate::fetch::FetchError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of a complete discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoverySummary {
    /// Number of queries issued.
    pub queries_issued: usize,

    /// Number of queries whose every page was fetched.
    pub queries_complete: usize,

    /// Number of queries that failed after fetching some pages.
    pub queries_partial: usize,

    /// Number of queries that failed before fetching any page.
    pub queries_failed: usize,

    /// Number of pages fetched across all queries.
    pub pages_fetched: usize,

    /// Number of raw records received.
    pub records_seen: usize,

    /// Number of records skipped as malformed.
    pub records_skipped: usize,

    /// Number of duplicate records collapsed.
    pub duplicates_collapsed: usize,

    /// Whether natural-language translation fell back to free-text search.
    pub translation_fallback: bool,

    /// Per-query outcomes, in query order.
    pub outcomes: Vec<QueryOutcome>,
}

impl DiscoverySummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(translation_fallback: bool) -> Self {
        Self {
            translation_fallback,
            ..Default::default()
        }
    }

    /// Updates the summary with a query outcome.
    pub fn record_outcome(&mut self, outcome: QueryOutcome) {
        self.queries_issued += 1;
        match &outcome {
            QueryOutcome::Complete { pages, records, .. } => {
                self.queries_complete += 1;
                self.pages_fetched += pages;
                self.records_seen += records;
            }
            QueryOutcome::Partial { pages, records, .. } => {
                self.queries_partial += 1;
                self.pages_fetched += pages;
                self.records_seen += records;
            }
            QueryOutcome::Failed { .. } => self.queries_failed += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Returns true if any query failed, fully or partially.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.queries_partial > 0 || self.queries_failed > 0
    }

    /// Returns true if every query failed before fetching anything.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.queries_issued > 0 && self.queries_failed == self.queries_issued
    }

    /// Failures in query order.
    pub fn failures(&self) -> impl Iterator<Item = &FetchError> {
        self.outcomes.iter().filter_map(QueryOutcome::error)
    }

    /// Latest rate-limit reset among the failures, i.e. when every throttled
    /// query could be retried.
    #[must_use]
    pub fn retry_after(&self) -> Option<DateTime<Utc>> {
        self.failures().filter_map(FetchError::reset_at).max()
    }
}
