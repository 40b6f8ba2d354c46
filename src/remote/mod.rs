//! Remote listings source.
//!
//! The [`HomesSource`] trait is the only thing the fetch coordinator knows
//! about the remote side. [`HttpHomesSource`] implements it against a
//! json-server style endpoint; tests substitute in-memory sources.

pub mod error;
pub mod http;

use std::future::Future;
use std::time::Duration;

use crate::error::Result;
use crate::types::{Listing, PageRequest, Paginated};

pub use error::ApiError;
pub use http::HttpHomesSource;

/// A paginated read-only source of listings.
pub trait HomesSource: Send + Sync {
    /// Fetch one page of listings.
    ///
    /// Out-of-range pages are passed through; how they are answered is up to
    /// the source.
    fn fetch_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Paginated<Listing>>> + Send;
}

impl<S: HomesSource> HomesSource for std::sync::Arc<S> {
    fn fetch_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Paginated<Listing>>> + Send {
        (**self).fetch_page(request)
    }
}

/// Classification of a failed HTTP attempt, used to decide on retries.
pub trait AsHttpError {
    /// Status code and Retry-After seconds, if the failure had a response
    fn as_http_error(&self) -> Option<(reqwest::StatusCode, Option<u64>)>;

    /// Whether trying again might succeed (server errors, timeouts, connection drops)
    fn is_transient(&self) -> bool;

    fn is_rate_limited(&self) -> bool {
        matches!(self.as_http_error(), Some((status, _)) if status.as_u16() == 429)
    }

    /// How long to wait before retrying a rate-limited request
    fn get_retry_after(&self) -> Option<Duration> {
        if !self.is_rate_limited() {
            return None;
        }
        let seconds = self
            .as_http_error()
            .and_then(|(_, retry_after)| retry_after)
            .unwrap_or(DEFAULT_RATE_LIMIT_WAIT_SECS);
        Some(Duration::from_secs(seconds))
    }
}

/// Wait used when a 429 arrives without a Retry-After header.
const DEFAULT_RATE_LIMIT_WAIT_SECS: u64 = 60;

/// Retry schedule for remote reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each later one
    pub initial_backoff: Duration,
    /// Longest Retry-After the client is willing to honour
    pub max_rate_limit_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_rate_limit_wait: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out.
///
/// Transient failures back off exponentially. Rate-limited failures wait for
/// the server's Retry-After when it is within the policy's limit, and give up
/// otherwise.
pub async fn execute_with_retry<T, E, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> std::result::Result<T, E>
where
    E: AsHttpError + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if attempt >= max_attempts {
            return Err(err);
        }

        let delay = if let Some(wait) = err.get_retry_after() {
            if wait > policy.max_rate_limit_wait {
                return Err(err);
            }
            wait
        } else if err.is_transient() {
            policy.backoff(attempt)
        } else {
            return Err(err);
        };

        tracing::debug!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            "Retrying listings request after error: {err}"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct FakeError {
        status: Option<u16>,
        retry_after: Option<u64>,
    }

    impl std::fmt::Display for FakeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "fake error {:?}", self.status)
        }
    }

    impl AsHttpError for FakeError {
        fn as_http_error(&self) -> Option<(reqwest::StatusCode, Option<u64>)> {
            self.status
                .and_then(|s| reqwest::StatusCode::from_u16(s).ok())
                .map(|s| (s, self.retry_after))
        }

        fn is_transient(&self) -> bool {
            self.status.is_none_or(|s| s >= 500)
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
            max_rate_limit_wait: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = execute_with_retry(fast_policy(), || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(FakeError {
                    status: Some(503),
                    retry_after: None,
                })
            } else {
                Ok(n)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: std::result::Result<(), FakeError> =
            execute_with_retry(fast_policy(), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FakeError {
                    status: None,
                    retry_after: None,
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: std::result::Result<(), FakeError> =
            execute_with_retry(fast_policy(), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FakeError {
                    status: Some(404),
                    retry_after: None,
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_honours_retry_after() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let start = tokio::time::Instant::now();
        let result = execute_with_retry(fast_policy(), || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(FakeError {
                    status: Some(429),
                    retry_after: Some(1),
                })
            } else {
                Ok(())
            }
        })
        .await;
        assert!(result.is_ok());
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_long_rate_limit_is_not_waited_out() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: std::result::Result<(), FakeError> =
            execute_with_retry(fast_policy(), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FakeError {
                    status: Some(429),
                    retry_after: Some(120),
                })
            })
            .await;
        assert!(result.unwrap_err().is_rate_limited());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(400));
        assert_eq!(policy.backoff(3), Duration::from_millis(800));
    }
}
