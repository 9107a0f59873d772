//! Rate-limited, paginated fetching.
//!
//! Every request reserves one unit from the shared [`QuotaLedger`] before it
//! is sent. Pages of one query are fetched sequentially; a failure stops the
//! query but keeps the pages already fetched, so callers can still rank
//! partial results.

mod backend;
mod error;
mod github;

pub use backend::{BackendError, SearchBackend, SearchPage};
pub use error::{FetchError, UpstreamCause};
pub use github::{OctocrabBackend, SEARCH_RESULT_WINDOW};

use crate::query::PlannedQuery;
use crate::rate_limit::{QuotaLedger, RateLimitInfo};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default number of results requested per page.
pub const DEFAULT_PER_PAGE: u8 = 50;

/// Default cap on results collected per query.
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Wait assumed when a throttled response carries no reset header.
const FALLBACK_RESET_SECS: i64 = 60;

/// Result of fetching every page of one query.
#[derive(Debug, Clone)]
pub struct QueryFetch {
    /// Label of the query's origin.
    pub origin: String,

    /// Rendered query string.
    pub query: String,

    /// Pages fetched before completion or failure, in order.
    pub pages: Vec<SearchPage>,

    /// Failure that stopped the query, if any.
    pub error: Option<FetchError>,
}

impl QueryFetch {
    /// Raw records across all fetched pages.
    pub fn records(&self) -> impl Iterator<Item = &Value> {
        self.pages.iter().flat_map(|page| page.items.iter())
    }

    /// Whether the query ran to completion.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Executes queries against a [`SearchBackend`] within the shared quota.
#[derive(Clone)]
pub struct Fetcher {
    backend: Arc<dyn SearchBackend>,
    ledger: Arc<QuotaLedger>,
    per_page: u8,
    max_results: usize,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("per_page", &self.per_page)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    /// Creates a fetcher with default paging.
    #[must_use]
    pub fn new(backend: Arc<dyn SearchBackend>, ledger: Arc<QuotaLedger>) -> Self {
        Self {
            backend,
            ledger,
            per_page: DEFAULT_PER_PAGE,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Sets the page size (clamped to 1-100).
    #[must_use]
    pub fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = per_page.clamp(1, 100);
        self
    }

    /// Sets the per-query result cap (clamped to the provider's window).
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.clamp(1, SEARCH_RESULT_WINDOW as usize);
        self
    }

    /// The shared quota ledger.
    #[must_use]
    pub fn ledger(&self) -> &Arc<QuotaLedger> {
        &self.ledger
    }

    /// Fetches pages of `planned` until the result cap, the last page, or
    /// the first failure.
    ///
    /// Never returns an error directly: a failure is recorded in
    /// [`QueryFetch::error`] next to the pages fetched before it.
    pub async fn fetch(&self, planned: &PlannedQuery) -> QueryFetch {
        let query = planned.spec.to_query_string();
        let mut fetch = QueryFetch {
            origin: planned.origin.clone(),
            query: query.clone(),
            pages: Vec::new(),
            error: None,
        };

        let mut page_number = planned.spec.page.max(1);
        let mut collected = 0usize;

        while collected < self.max_results {
            let permit = match self.ledger.acquire() {
                Ok(permit) => permit,
                Err(exhausted) => {
                    warn!(%query, reset_at = %exhausted.reset_at, "Local quota exhausted");
                    fetch.error = Some(FetchError::RateLimitExceeded {
                        query,
                        reset_at: exhausted.reset_at,
                    });
                    break;
                }
            };

            match self
                .backend
                .search(&planned.spec, page_number, self.per_page)
                .await
            {
                Ok(mut page) => {
                    permit.commit(page.rate_limit);

                    let received = page.items.len();
                    let room = self.max_results - collected;
                    page.items.truncate(room);
                    collected += page.items.len();

                    let more = page.has_next && received >= usize::from(self.per_page);
                    debug!(
                        %query,
                        page = page_number,
                        received,
                        total = page.total_count,
                        "Fetched search page"
                    );
                    fetch.pages.push(page);

                    if !more {
                        break;
                    }
                    page_number += 1;
                }
                Err(e) if e.is_throttled() => {
                    let reset_at = e.reset_at().unwrap_or_else(fallback_reset);
                    permit.throttled(reset_at);
                    warn!(%query, page = page_number, %reset_at, "Search throttled by provider");
                    fetch.error = Some(FetchError::RateLimitExceeded { query, reset_at });
                    break;
                }
                Err(e) => {
                    drop(permit);
                    warn!(%query, page = page_number, error = %e, "Search request failed");
                    fetch.error = Some(FetchError::Upstream {
                        query,
                        cause: e.into(),
                    });
                    break;
                }
            }
        }

        info!(
            query = %fetch.query,
            pages = fetch.pages.len(),
            records = collected,
            complete = fetch.is_complete(),
            "Query finished"
        );
        fetch
    }

    /// Fetches the current record of one repository.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::RateLimitExceeded`] when the quota is exhausted
    /// or the provider throttles, and [`FetchError::Upstream`] otherwise.
    pub async fn repository(&self, full_name: &str) -> Result<Value, FetchError> {
        let permit = self
            .ledger
            .acquire()
            .map_err(|exhausted| FetchError::RateLimitExceeded {
                query: full_name.to_string(),
                reset_at: exhausted.reset_at,
            })?;

        match self.backend.repository(full_name).await {
            Ok(record) => {
                // Single-resource responses count against the core quota,
                // not the search one, so their headers are not synced.
                permit.commit(None);
                Ok(record)
            }
            Err(e) if e.is_throttled() => {
                let reset_at = e.reset_at().unwrap_or_else(fallback_reset);
                permit.throttled(reset_at);
                Err(FetchError::RateLimitExceeded {
                    query: full_name.to_string(),
                    reset_at,
                })
            }
            Err(e) => Err(FetchError::Upstream {
                query: full_name.to_string(),
                cause: e.into(),
            }),
        }
    }

    /// Re-reads the search quota from the provider and syncs the ledger.
    ///
    /// Does not consume quota.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Upstream`] if the rate-limit endpoint fails.
    pub async fn refresh_quota(&self) -> Result<RateLimitInfo, FetchError> {
        let info = self
            .backend
            .rate_limit()
            .await
            .map_err(|e| FetchError::Upstream {
                query: "rate_limit".to_string(),
                cause: e.into(),
            })?;
        self.ledger.sync(info);
        Ok(info)
    }
}

fn fallback_reset() -> DateTime<Utc> {
    Utc::now() + Duration::seconds(FALLBACK_RESET_SECS)
}
