//! Per-query outcome types.

use crate::fetch::{FetchError, QueryFetch};
use serde::{Serialize, Serializer};
use std::fmt::Display;

/// Outcome of fetching a single query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum QueryOutcome {
    /// Every page was fetched.
    Complete {
        /// Origin label of the query.
        origin: String,
        /// Rendered query string.
        query: String,
        /// Pages fetched.
        pages: usize,
        /// Raw records received.
        records: usize,
    },

    /// Some pages were fetched before a failure.
    Partial {
        /// Origin label of the query.
        origin: String,
        /// Rendered query string.
        query: String,
        /// Pages fetched before the failure.
        pages: usize,
        /// Raw records received before the failure.
        records: usize,
        /// Failure that stopped the query.
        #[serde(serialize_with = "as_display")]
        error: FetchError,
    },

    /// The first request already failed.
    Failed {
        /// Origin label of the query.
        origin: String,
        /// Rendered query string.
        query: String,
        /// Failure that stopped the query.
        #[serde(serialize_with = "as_display")]
        error: FetchError,
    },
}

impl QueryOutcome {
    /// Classifies a fetched query.
    #[must_use]
    pub fn from_fetch(fetch: &QueryFetch) -> Self {
        let origin = fetch.origin.clone();
        let query = fetch.query.clone();
        let pages = fetch.pages.len();
        let records = fetch.records().count();

        match (&fetch.error, pages) {
            (None, _) => QueryOutcome::Complete {
                origin,
                query,
                pages,
                records,
            },
            (Some(error), 0) => QueryOutcome::Failed {
                origin,
                query,
                error: error.clone(),
            },
            (Some(error), _) => QueryOutcome::Partial {
                origin,
                query,
                pages,
                records,
                error: error.clone(),
            },
        }
    }

    /// Failure attached to the outcome, if any.
    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            QueryOutcome::Complete { .. } => None,
            QueryOutcome::Partial { error, .. } | QueryOutcome::Failed { error, .. } => {
                Some(error)
            }
        }
    }
}

fn as_display<S: Serializer, T: Display>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
