//! Fetch error types.

use crate::llm::LlmError;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Why an upstream call failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamCause {
    /// Non-success HTTP status other than throttling.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Network or client failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The caller-supplied deadline passed.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// The completion provider returned an error.
    #[error("completion failed: {0}")]
    Completion(String),
}

impl UpstreamCause {
    /// Maps a completion error, reporting timeouts against `deadline`.
    #[must_use]
    pub fn from_completion(error: &LlmError, deadline: Duration) -> Self {
        match error {
            LlmError::Timeout(_) => UpstreamCause::TimedOut(deadline),
            other => UpstreamCause::Completion(other.to_string()),
        }
    }
}

/// Error produced by the rate-limited fetcher.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Quota exhausted locally, or the provider throttled the request.
    #[error("Rate limit exceeded for '{query}'; resets at {reset_at}")]
    RateLimitExceeded {
        /// Rendered query (or repository) the request was for.
        query: String,
        reset_at: DateTime<Utc>,
    },

    /// Any other upstream failure. Not retried automatically.
    #[error("Upstream error for '{query}': {cause}")]
    Upstream { query: String, cause: UpstreamCause },
}

impl FetchError {
    /// The query or repository the failed request was for.
    #[must_use]
    pub fn query(&self) -> &str {
        match self {
            FetchError::RateLimitExceeded { query, .. } | FetchError::Upstream { query, .. } => {
                query
            }
        }
    }

    /// Reset time, for rate-limit failures.
    #[must_use]
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        match self {
            FetchError::RateLimitExceeded { reset_at, .. } => Some(*reset_at),
            FetchError::Upstream { .. } => None,
        }
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimitExceeded { .. })
    }
}
