//! Configuration table types.

use serde::Deserialize;

use crate::fetch::{DEFAULT_MAX_RESULTS, DEFAULT_PER_PAGE};

/// `[search]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SearchConfig {
    /// Results requested per page (1-100).
    pub per_page: u8,

    /// Results collected per query.
    pub max_results: usize,

    /// Queries fetched in parallel.
    pub concurrency: usize,

    /// Starting quota; defaults depend on whether a token is set.
    pub initial_quota: Option<u32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            max_results: DEFAULT_MAX_RESULTS,
            concurrency: default_concurrency(),
            initial_quota: None,
        }
    }
}

pub(crate) fn default_concurrency() -> usize {
    4
}

/// `[analysis]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AnalysisConfig {
    /// Deadline for every completion call, in seconds.
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

pub(crate) fn default_timeout_secs() -> u64 {
    120
}
