//! Ranked, deduplicated result sets.

use crate::repository::RepositorySummary;
use serde::Serialize;
use std::cmp::Ordering;

/// A repository with its trending score and the query it was found under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRepository {
    #[serde(flatten)]
    pub repository: RepositorySummary,
    pub score: f64,
    pub origin: String,
}

impl ScoredRepository {
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.repository.full_name
    }
}

/// Descending score, then ascending identifier.
pub(crate) fn rank_order(a: &ScoredRepository, b: &ScoredRepository) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.full_name().cmp(b.full_name()))
}

/// Repositories sorted by descending score, ties broken by ascending
/// identifier. Identifiers are unique.
///
/// The set belongs to the caller; it is never cleared implicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedResultSet {
    entries: Vec<ScoredRepository>,
}

impl RankedResultSet {
    /// Sorts `entries` into a ranked set. Callers guarantee unique
    /// identifiers.
    pub(crate) fn from_unique(mut entries: Vec<ScoredRepository>) -> Self {
        entries.sort_by(rank_order);
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in rank order.
    pub fn iter(&self) -> std::slice::Iter<'_, ScoredRepository> {
        self.entries.iter()
    }

    /// The first `n` entries.
    #[must_use]
    pub fn top(&self, n: usize) -> &[ScoredRepository] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Looks up an entry by identifier, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&ScoredRepository> {
        self.position(full_name).map(|i| &self.entries[i])
    }

    /// Zero-based rank of an identifier, ignoring ASCII case.
    #[must_use]
    pub fn position(&self, full_name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.full_name().eq_ignore_ascii_case(full_name))
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replaces the contents with `other`, returning the previous set.
    pub fn replace(&mut self, other: RankedResultSet) -> RankedResultSet {
        std::mem::replace(self, other)
    }

    /// Consumes the set, returning entries in rank order.
    #[must_use]
    pub fn into_vec(self) -> Vec<ScoredRepository> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a RankedResultSet {
    type Item = &'a ScoredRepository;
    type IntoIter = std::slice::Iter<'a, ScoredRepository>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
