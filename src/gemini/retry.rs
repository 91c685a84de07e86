//! Retry, backoff and polling policy for Gemini API operations.
//!
//! Submissions may be retried on transient errors and rate limiting with
//! exponential backoff. Long-running video operations are polled at a fixed
//! interval under a bounded [`PollPolicy`].

use std::time::Duration;

use rand::Rng;

/// Default number of retry attempts for rate-limited requests.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default number of retry attempts for transient network errors.
pub const DEFAULT_NETWORK_RETRIES: u32 = 3;

/// Base delay for exponential backoff (1 second).
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Maximum delay cap for exponential backoff (60 seconds).
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(60);

/// Delay between two polls of a video operation (5 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Maximum number of polls before a video operation is abandoned.
pub const DEFAULT_MAX_POLLS: u32 = 120;

/// Overall deadline for a video operation (15 minutes).
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(900);

/// Bounded fixed-interval polling policy for long-running operations.
///
/// The poll loop gives up as soon as either `max_attempts` polls have been
/// made or `timeout` has elapsed since submission, whichever comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before each poll.
    pub interval: Duration,
    /// Maximum number of polls.
    pub max_attempts: u32,
    /// Overall deadline measured from submission.
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLLS,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32, timeout: Duration) -> Self {
        Self {
            interval,
            max_attempts,
            timeout,
        }
    }

    /// Whether another poll is allowed after `attempts` polls and `elapsed` time.
    pub fn allows(&self, attempts: u32, elapsed: Duration) -> bool {
        attempts < self.max_attempts && elapsed.saturating_add(self.interval) <= self.timeout
    }
}

/// Determine if a reqwest error is a transient network error that should be retried.
///
/// Returns true for connection errors, timeouts, and other temporary failures.
/// Returns false for errors that are unlikely to resolve on retry.
pub fn is_transient_network_error(error: &reqwest::Error) -> bool {
    if error.is_connect() || error.is_timeout() || error.is_body() {
        return true;
    }

    // 502 Bad Gateway, 503 Service Unavailable, 504 Gateway Timeout
    if let Some(status) = error.status() {
        return matches!(status.as_u16(), 502..=504);
    }

    false
}

/// Parse the Retry-After header value to get retry delay in seconds.
///
/// Only the integer seconds form is understood; an HTTP-date yields `None`.
pub fn parse_retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

/// Calculate exponential backoff delay with random jitter.
///
/// Uses the formula: min(base * 2^attempt + jitter, max_delay)
/// where jitter is drawn uniformly from 0 to half the base, capped at 500ms.
pub fn calculate_backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    let exponential = base.saturating_mul(2u32.saturating_pow(attempt));
    let jitter_max_ms = (base.as_millis() as u64).min(1000) / 2;
    let jitter = Duration::from_millis(rand::rng().random_range(0..=jitter_max_ms));
    exponential.saturating_add(jitter).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_calculate_backoff_first_attempt() {
        let delay = calculate_backoff(0, Duration::from_secs(1), Duration::from_secs(60));
        assert!(delay >= Duration::from_secs(1));
        assert!(delay <= Duration::from_millis(1500));
    }

    #[test]
    fn test_calculate_backoff_grows_per_attempt() {
        let first = calculate_backoff(0, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX);
        let second = calculate_backoff(1, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX);
        let third = calculate_backoff(2, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX);
        assert!(first < second);
        assert!(second < third);
        assert!(third >= Duration::from_secs(4));
    }

    #[test]
    fn test_calculate_backoff_respects_max() {
        let delay = calculate_backoff(10, Duration::from_secs(1), Duration::from_secs(60));
        assert_eq!(delay, Duration::from_secs(60));
    }

    #[test]
    fn test_calculate_backoff_with_small_base() {
        let delay = calculate_backoff(0, Duration::from_millis(100), Duration::from_secs(10));
        assert!(delay >= Duration::from_millis(100));
        assert!(delay <= Duration::from_millis(150));
    }

    #[test]
    fn test_calculate_backoff_jitter_varies_within_bounds() {
        let delays: HashSet<Duration> = (0..200)
            .map(|_| calculate_backoff(1, Duration::from_secs(1), Duration::from_secs(60)))
            .collect();
        assert!(delays
            .iter()
            .all(|d| *d >= Duration::from_secs(2) && *d <= Duration::from_millis(2500)));
        assert!(delays.len() > 1, "jitter never varied: {:?}", delays);
    }

    #[test]
    fn test_calculate_backoff_zero_base_has_no_jitter() {
        assert_eq!(calculate_backoff(3, Duration::ZERO, Duration::from_secs(1)), Duration::ZERO);
    }

    #[test]
    fn test_default_poll_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(5));
        assert_eq!(policy.max_attempts, 120);
        assert_eq!(policy.timeout, Duration::from_secs(900));
    }

    #[test]
    fn test_poll_policy_stops_at_max_attempts() {
        let policy = PollPolicy::new(Duration::from_millis(10), 3, Duration::from_secs(60));
        assert!(policy.allows(0, Duration::ZERO));
        assert!(policy.allows(2, Duration::ZERO));
        assert!(!policy.allows(3, Duration::ZERO));
    }

    #[test]
    fn test_poll_policy_stops_at_timeout() {
        let policy = PollPolicy::new(Duration::from_secs(5), 100, Duration::from_secs(20));
        assert!(policy.allows(1, Duration::from_secs(15)));
        assert!(!policy.allows(1, Duration::from_secs(16)));
    }

    #[test]
    fn test_zero_attempt_policy_never_polls() {
        let policy = PollPolicy::new(Duration::from_secs(1), 0, Duration::from_secs(60));
        assert!(!policy.allows(0, Duration::ZERO));
    }
}
