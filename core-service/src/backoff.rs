//! Bounded retry for rate-limited remote calls.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::error::{Result, ServiceError};

/// Number of attempts before a rate-limited call is given up on.
pub const MAX_ATTEMPTS: u32 = 3;

/// Delay applied when the server does not say how long to wait.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_millis(500);

/// Ceiling on server-declared delays. A `Retry-After` above this is treated
/// as a refusal to serve rather than a pause worth honoring.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(300);

/// Run `operation`, retrying up to [`MAX_ATTEMPTS`] times when it fails with
/// [`ServiceError::RateLimited`].
///
/// The server-declared delay is honored when present and within
/// [`MAX_RETRY_AFTER`]; a longer delay fails immediately without sleeping.
/// Every other error kind is returned on the first occurrence.
pub async fn with_backoff<T, F, Fut>(mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(ServiceError::RateLimited { retry_after }) => {
                let delay = retry_after.unwrap_or(DEFAULT_RETRY_AFTER);
                if delay > MAX_RETRY_AFTER {
                    warn!(
                        retry_after_secs = delay.as_secs(),
                        "rate limit delay exceeds the ceiling, giving up"
                    );
                    return Err(ServiceError::RateLimited { retry_after });
                }
                if attempt >= MAX_ATTEMPTS {
                    warn!(attempts = attempt, "rate limited on every attempt, giving up");
                    return Err(ServiceError::RateLimited { retry_after });
                }
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited, backing off"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(other) => return Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn rate_limited(retry_after: Option<Duration>) -> ServiceError {
        ServiceError::RateLimited { retry_after }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_rate_limit() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = with_backoff(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(rate_limited(Some(Duration::from_secs(1))))
                } else {
                    Ok(42)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<()> = with_backoff(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(rate_limited(None)) }
        })
        .await;
        assert!(matches!(result, Err(ServiceError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_excessive_retry_after_fails_without_sleeping() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        // Real time on purpose: an hour-long delay must not be slept.
        let result: Result<()> = with_backoff(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(rate_limited(Some(Duration::from_secs(3600)))) }
        })
        .await;
        assert!(matches!(result, Err(ServiceError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<()> = with_backoff(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(ServiceError::RemoteNotFound("gone".to_string())) }
        })
        .await;
        assert!(matches!(result, Err(ServiceError::RemoteNotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
