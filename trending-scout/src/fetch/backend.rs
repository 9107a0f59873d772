//! The search backend seam.

use crate::query::QuerySpec;
use crate::rate_limit::RateLimitInfo;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use super::UpstreamCause;

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// Total matches reported by the provider.
    pub total_count: u64,

    /// Whether the provider timed out while collecting matches.
    pub incomplete_results: bool,

    /// Raw repository records, decoded later one at a time.
    pub items: Vec<Value>,

    /// Whether the provider reports a further page.
    pub has_next: bool,

    /// Rate-limit headers of the response, when present.
    pub rate_limit: Option<RateLimitInfo>,
}

/// Failure reported by a [`SearchBackend`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Non-success HTTP response.
    #[error("HTTP {code}: {message}")]
    Status {
        code: u16,
        /// Reset time from the response headers, if any.
        reset_at: Option<DateTime<Utc>>,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl BackendError {
    /// Whether the provider throttled the request (HTTP 403 or 429).
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        matches!(self, BackendError::Status { code: 403 | 429, .. })
    }

    /// Reset time reported alongside the failure.
    #[must_use]
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        match self {
            BackendError::Status { reset_at, .. } => *reset_at,
            _ => None,
        }
    }
}

impl From<BackendError> for UpstreamCause {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Status { code, .. } => UpstreamCause::Status(code),
            BackendError::Transport(msg) => UpstreamCause::Transport(msg),
            BackendError::Decode(msg) => UpstreamCause::Decode(msg),
        }
    }
}

/// Repository search provider.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Fetches one page of results for `query`.
    async fn search(
        &self,
        query: &QuerySpec,
        page: u32,
        per_page: u8,
    ) -> Result<SearchPage, BackendError>;

    /// Fetches the current record of a single repository.
    async fn repository(&self, full_name: &str) -> Result<Value, BackendError>;

    /// Reads the search quota from the provider's rate-limit endpoint.
    async fn rate_limit(&self) -> Result<RateLimitInfo, BackendError>;
}
