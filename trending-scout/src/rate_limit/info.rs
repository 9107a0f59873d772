//! Rate limit information.

use chrono::{DateTime, TimeZone, Utc};
use http::HeaderMap;
use serde::Serialize;

const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const LIMIT_HEADER: &str = "x-ratelimit-limit";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Rate limit information for the search resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// When the rate limit window resets.
    pub reset: DateTime<Utc>,

    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// Reads the `x-ratelimit-*` headers of a response.
    ///
    /// Returns `None` unless both the remaining count and the reset epoch
    /// are present and numeric. A missing limit header falls back to the
    /// remaining count.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let remaining = header_u64(headers, REMAINING_HEADER)?;
        let reset = header_u64(headers, RESET_HEADER).and_then(epoch_to_utc)?;
        let limit = header_u64(headers, LIMIT_HEADER).unwrap_or(remaining);

        Some(Self {
            remaining: saturate(remaining),
            reset,
            limit: saturate(limit),
        })
    }
}

/// Reads only the reset epoch, used for throttled responses that may omit
/// the other headers.
pub(crate) fn reset_from_headers(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    header_u64(headers, RESET_HEADER).and_then(epoch_to_utc)
}

/// Converts a Unix epoch in seconds to a UTC timestamp.
pub(crate) fn epoch_to_utc(epoch: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(epoch).ok()?;
    Utc.timestamp_opt(secs, 0).single()
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_rate_limit_info_from_headers() {
        let info = RateLimitInfo::from_headers(&headers(&[
            ("x-ratelimit-remaining", "27"),
            ("x-ratelimit-limit", "30"),
            ("x-ratelimit-reset", "1234567890"),
        ]))
        .unwrap();

        assert_eq!(info.remaining, 27);
        assert_eq!(info.limit, 30);
        assert_eq!(info.reset.timestamp(), 1234567890);
    }

    #[test]
    fn missing_reset_yields_none() {
        let info = RateLimitInfo::from_headers(&headers(&[("x-ratelimit-remaining", "27")]));
        assert!(info.is_none());
    }

    #[test]
    fn garbage_values_yield_none() {
        let info = RateLimitInfo::from_headers(&headers(&[
            ("x-ratelimit-remaining", "lots"),
            ("x-ratelimit-reset", "1234567890"),
        ]));
        assert!(info.is_none());
    }

    #[test]
    fn limit_defaults_to_remaining() {
        let info = RateLimitInfo::from_headers(&headers(&[
            ("x-ratelimit-remaining", "9"),
            ("x-ratelimit-reset", "1234567890"),
        ]))
        .unwrap();
        assert_eq!(info.limit, 9);
    }
}
