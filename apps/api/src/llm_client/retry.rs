//! Retry and polling budgets shared by every outbound LLM call.
//!
//! Every remote call goes through one `RetryPolicy` — call sites never
//! hand-roll their own backoff loops.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// A retried operation that never succeeded. Carries the last cause.
#[derive(Debug)]
pub struct RetryError<E> {
    pub attempts: u32,
    pub last: E,
}

impl RetryPolicy {
    /// Backoff before retry number `retry` (1-based): 1s, 2s, 4s, ...
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        self.base_delay * (1 << (retry.saturating_sub(1)))
    }

    /// Runs `op` until it succeeds or the attempt ceiling is reached.
    /// `label` identifies the call site in the logs.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let attempts = self.max_attempts.max(1);

        let mut last = match op().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        for attempt in 2..=attempts {
            let delay = self.backoff_delay(attempt - 1);
            warn!(
                "{label}: attempt {} failed ({last}), retrying after {}ms",
                attempt - 1,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;

            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => last = e,
            }
        }

        Err(RetryError { attempts, last })
    }
}

/// Budget for polling a remote asynchronous run: iteration ceiling plus
/// fixed spacing between polls. Independent of the retry ceiling.
#[derive(Debug, Clone, Copy)]
pub struct PollBudget {
    pub max_polls: u32,
    pub interval: Duration,
}

impl Default for PollBudget {
    fn default() -> Self {
        Self {
            max_polls: 90,
            interval: Duration::from_secs(1),
        }
    }
}
