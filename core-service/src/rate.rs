//! Client-side request rate limiting.
//!
//! Grounded on a sliding-window token scheme: up to `max_calls` acquisitions
//! per `interval`, with the caller suspended until the window rolls over
//! when the budget is spent. Callers share a limiter via `Arc`; because
//! transfers are sequential there is at most one task waiting, but the
//! tokio mutex keeps the accounting correct if that ever changes.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

struct Window {
    started: Instant,
    calls: u32,
}

/// Limits calls to `max_calls` per `interval`, suspending the caller when
/// the current window's budget is exhausted.
pub struct RateLimiter {
    max_calls: u32,
    interval: Duration,
    window: Mutex<Window>,
}

impl RateLimiter {
    pub fn new(max_calls: u32, interval: Duration) -> Self {
        Self {
            max_calls,
            interval,
            window: Mutex::new(Window {
                started: Instant::now(),
                calls: 0,
            }),
        }
    }

    /// Take one call from the budget, sleeping into the next window first
    /// if the current one is spent.
    pub async fn acquire(&self) {
        let mut window = self.window.lock().await;
        let now = Instant::now();

        if now.duration_since(window.started) >= self.interval {
            window.started = now;
            window.calls = 0;
        }

        if window.calls >= self.max_calls {
            let resume_at = window.started + self.interval;
            debug!(
                wait_ms = resume_at.duration_since(now).as_millis() as u64,
                "rate budget spent, waiting for the next window"
            );
            sleep_until(resume_at).await;
            window.started = resume_at;
            window.calls = 0;
        }

        window.calls += 1;
    }
}
