//! Server-reported rate limit status and the doze rule.
//!
//! This is a reactive throttle: the server's own remaining-call count
//! and reset countdown decide when to wait, there is no local token
//! bucket. It assumes this process is the sole caller against the quota
//! for the duration of the run.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Remaining calls below this trigger a doze.
const LOW_CALLS: u32 = 10;

/// A reset countdown below this (seconds) triggers a doze.
const LOW_RESET_SECS: u64 = 10;

/// Safety margin added on top of the server's countdown.
const DOZE_MARGIN_SECS: u64 = 5;

/// Rate limit feedback attached to an API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Calls left in the current window.
    pub remaining_calls: u32,

    /// Seconds until the window resets.
    pub seconds_until_reset: u64,
}

impl RateLimitStatus {
    /// Parse status from Twitter's `x-rate-limit-*` response headers.
    ///
    /// The reset header carries a unix timestamp; it is converted to a
    /// countdown relative to now. Returns `None` if either header is
    /// missing or unparsable.
    #[must_use]
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Option<Self> {
        let remaining = header_value(headers, "x-rate-limit-remaining")?;
        let reset_at = header_value(headers, "x-rate-limit-reset")?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()?
            .as_secs();

        Some(Self {
            remaining_calls: u32::try_from(remaining).unwrap_or(u32::MAX),
            seconds_until_reset: reset_at.saturating_sub(now),
        })
    }

    /// How long to block before the next call, if the quota is nearly
    /// exhausted.
    ///
    /// Returns the server's countdown plus a fixed safety margin when
    /// either fewer than 10 calls remain or the window resets in under
    /// 10 seconds; otherwise `None`.
    #[must_use]
    pub const fn doze_duration(&self) -> Option<Duration> {
        if self.seconds_until_reset < LOW_RESET_SECS || self.remaining_calls < LOW_CALLS {
            Some(Duration::from_secs(
                self.seconds_until_reset + DOZE_MARGIN_SECS,
            ))
        } else {
            None
        }
    }
}

fn header_value(headers: &reqwest::header::HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    fn headers(remaining: &str, reset: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            "x-rate-limit-remaining",
            HeaderValue::from_str(remaining).unwrap(),
        );
        map.insert("x-rate-limit-reset", HeaderValue::from_str(reset).unwrap());
        map
    }

    #[test]
    fn low_remaining_calls_triggers_doze() {
        let status = RateLimitStatus {
            remaining_calls: 5,
            seconds_until_reset: 20,
        };
        assert_eq!(status.doze_duration(), Some(Duration::from_secs(25)));
    }

    #[test]
    fn imminent_reset_triggers_doze() {
        let status = RateLimitStatus {
            remaining_calls: 50,
            seconds_until_reset: 3,
        };
        assert_eq!(status.doze_duration(), Some(Duration::from_secs(8)));
    }

    #[test]
    fn healthy_quota_does_not_doze() {
        let status = RateLimitStatus {
            remaining_calls: 50,
            seconds_until_reset: 600,
        };
        assert_eq!(status.doze_duration(), None);
    }

    #[test]
    fn boundary_values_do_not_doze() {
        let status = RateLimitStatus {
            remaining_calls: 10,
            seconds_until_reset: 10,
        };
        assert_eq!(status.doze_duration(), None);
    }

    #[test]
    fn parses_reset_timestamp_into_countdown() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let map = headers("42", &(now + 120).to_string());
        let status = RateLimitStatus::from_headers(&map).unwrap();
        assert_eq!(status.remaining_calls, 42);
        // Allow a little slack for the wall clock moving during the test.
        assert!(status.seconds_until_reset >= 118 && status.seconds_until_reset <= 120);
    }

    #[test]
    fn reset_in_the_past_clamps_to_zero() {
        let map = headers("42", "1000000");
        let status = RateLimitStatus::from_headers(&map).unwrap();
        assert_eq!(status.seconds_until_reset, 0);
    }

    #[test]
    fn missing_headers_yield_none() {
        let map = HeaderMap::new();
        assert_eq!(RateLimitStatus::from_headers(&map), None);
    }
}
