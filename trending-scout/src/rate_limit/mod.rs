//! Quota accounting for the search API.
//!
//! Concurrent fetches share one [`QuotaLedger`]. Every request reserves a
//! unit through [`QuotaLedger::acquire`]; the reservation is committed on
//! success and refunded otherwise, so two fetches can never both spend the
//! last remaining request.

mod info;

pub use info::RateLimitInfo;
pub(crate) use info::{epoch_to_utc, reset_from_headers};

use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Length of the provider's rate-limit window.
fn window() -> Duration {
    Duration::hours(1)
}

/// Default hourly quota for authenticated clients.
pub const AUTHENTICATED_QUOTA: u32 = 5000;

/// Default hourly quota for anonymous clients.
pub const ANONYMOUS_QUOTA: u32 = 60;

/// The local ledger has no requests left before the reset time.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Quota exhausted until {reset_at}")]
pub struct QuotaExhausted {
    /// When the quota window resets.
    pub reset_at: DateTime<Utc>,
}

/// Shared, synchronized record of the remaining request quota.
#[derive(Debug)]
pub struct QuotaLedger {
    state: Mutex<RateLimitInfo>,
}

impl QuotaLedger {
    /// Creates a ledger with `limit` requests available until `reset`.
    pub fn new(limit: u32, reset: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(RateLimitInfo {
                remaining: limit,
                reset,
                limit,
            }),
        }
    }

    /// Creates a ledger with a full window starting now.
    pub fn with_limit(limit: u32) -> Self {
        Self::new(limit, Utc::now() + window())
    }

    /// Returns the current remaining count, reset time and limit.
    pub fn snapshot(&self) -> RateLimitInfo {
        let mut state = self.lock();
        replenish_if_expired(&mut state, Utc::now());
        *state
    }

    /// Reserves one request.
    ///
    /// The returned permit refunds the reservation when dropped unless
    /// [`QuotaPermit::commit`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaExhausted`] if no requests remain before the reset.
    pub fn acquire(&self) -> Result<QuotaPermit<'_>, QuotaExhausted> {
        let mut state = self.lock();
        replenish_if_expired(&mut state, Utc::now());

        if state.remaining == 0 {
            return Err(QuotaExhausted {
                reset_at: state.reset,
            });
        }

        state.remaining -= 1;
        debug!(remaining = state.remaining, "Reserved search quota");
        Ok(QuotaPermit {
            ledger: self,
            committed: false,
        })
    }

    /// Replaces local estimates with values reported by the provider.
    pub fn sync(&self, info: RateLimitInfo) {
        let mut state = self.lock();
        *state = info;
        debug!(
            remaining = info.remaining,
            limit = info.limit,
            reset = %info.reset,
            "Synchronized quota with provider"
        );
    }

    /// Marks the quota as exhausted until `reset_at`.
    ///
    /// Used when the provider throttles a request; the remote answer wins
    /// over whatever the ledger believed.
    pub fn exhaust(&self, reset_at: DateTime<Utc>) {
        let mut state = self.lock();
        state.remaining = 0;
        state.reset = reset_at;
        warn!(reset = %reset_at, "Search quota exhausted by provider");
    }

    fn refund(&self) {
        let mut state = self.lock();
        state.remaining = state.remaining.saturating_add(1).min(state.limit);
    }

    fn lock(&self) -> MutexGuard<'_, RateLimitInfo> {
        // The state is plain data; a poisoned lock still holds a usable value.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A reserved request slot. Dropping it without committing refunds it.
#[must_use = "dropping a permit refunds the reserved request"]
#[derive(Debug)]
pub struct QuotaPermit<'a> {
    ledger: &'a QuotaLedger,
    committed: bool,
}

impl QuotaPermit<'_> {
    /// Commits the reservation after a successful call.
    ///
    /// When the response carried rate-limit headers they replace the local
    /// estimate, since the provider already counted this request.
    pub fn commit(mut self, reported: Option<RateLimitInfo>) {
        self.committed = true;
        if let Some(info) = reported {
            self.ledger.sync(info);
        }
    }

    /// Consumes the reservation after the provider throttled the request
    /// and zeroes the ledger until `reset_at`.
    pub fn throttled(mut self, reset_at: DateTime<Utc>) {
        self.committed = true;
        self.ledger.exhaust(reset_at);
    }
}

impl Drop for QuotaPermit<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.ledger.refund();
        }
    }
}

fn replenish_if_expired(state: &mut RateLimitInfo, now: DateTime<Utc>) {
    if state.remaining == 0 && now >= state.reset {
        state.remaining = state.limit;
        state.reset = now + window();
        info!(limit = state.limit, "Quota window reset, replenished");
    }
}
