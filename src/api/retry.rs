use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::db::Database;
use crate::error::ApiError;

/// Wraps single outbound calls with persisted exponential backoff.
///
/// The backoff deadline is stored per endpoint key, so a wait that was in
/// progress when the process died is resumed, not restarted, on the next
/// call after a restart.
pub struct RetryingExecutor {
    db: Database,
    default_wait: Duration,
}

impl RetryingExecutor {
    pub fn new(db: Database, default_wait: Duration) -> Self {
        RetryingExecutor { db, default_wait }
    }

    /// Run `op`, retrying rate-limit and timeout failures indefinitely with
    /// a persisted wait between attempts. Rate-limit waits honour the
    /// server's Retry-After hint when present. Not-found and unclassified
    /// errors propagate immediately.
    ///
    /// The retry loop has no attempt ceiling for the retryable classes;
    /// callers own any overall deadline.
    pub async fn execute<T, F, Fut>(&self, endpoint: &str, op: F) -> Result<T, ApiError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        loop {
            self.await_pending_backoff(endpoint).await?;

            match op().await {
                Ok(value) => {
                    self.db.clear_retry_state(endpoint)?;
                    return Ok(value);
                }
                Err(ApiError::RateLimited { retry_after }) => {
                    let wait = retry_after.unwrap_or(self.default_wait);
                    warn!(
                        endpoint,
                        wait_ms = wait.as_millis() as u64,
                        "rate limited, backing off"
                    );
                    self.schedule_and_wait(endpoint, wait).await?;
                }
                Err(ApiError::Timeout) => {
                    warn!(
                        endpoint,
                        wait_ms = self.default_wait.as_millis() as u64,
                        "timed out, backing off"
                    );
                    self.schedule_and_wait(endpoint, self.default_wait).await?;
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Sleep out a persisted deadline from a previous run, or clear it if
    /// it has already passed.
    async fn await_pending_backoff(&self, endpoint: &str) -> Result<(), ApiError> {
        let Some(next_attempt_at) = self.db.get_retry_state(endpoint)? else {
            return Ok(());
        };
        let now = Utc::now().timestamp_millis();
        if next_attempt_at > now {
            let wait = Duration::from_millis((next_attempt_at - now) as u64);
            debug!(
                endpoint,
                wait_ms = wait.as_millis() as u64,
                "resuming persisted backoff"
            );
            tokio::time::sleep(wait).await;
        } else {
            self.db.clear_retry_state(endpoint)?;
        }
        Ok(())
    }

    async fn schedule_and_wait(&self, endpoint: &str, wait: Duration) -> Result<(), ApiError> {
        let next = Utc::now().timestamp_millis() + wait.as_millis() as i64;
        self.db.set_retry_state(endpoint, next)?;
        tokio::time::sleep(wait).await;
        Ok(())
    }
}

/// Bounded retry with doubling delay, for calls where durable backoff is
/// unnecessary (a live-score poll is stale by the time a long wait ends).
///
/// Not-found propagates immediately; otherwise the last error surfaces once
/// the attempt budget is exhausted.
pub async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    initial_delay: Duration,
    op: F,
) -> Result<T, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut delay = initial_delay;
    let mut last_error = None;
    for attempt in 1..=max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(ApiError::NotFound) => return Err(ApiError::NotFound),
            Err(e) => {
                debug!(attempt, error = %e, "attempt failed");
                last_error = Some(e);
                if attempt < max_attempts {
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
    Err(last_error.unwrap_or(ApiError::Timeout))
}
