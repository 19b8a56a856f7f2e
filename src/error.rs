use std::time::Duration;

use thiserror::Error;

/// Classified failures from the sports-data API and the stores behind it.
///
/// The retry layer dispatches on the variant: `RateLimited` and `Timeout`
/// are retried under persisted backoff, `NotFound` and everything else
/// propagate to the caller unchanged.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 404. Never retried and never queued for backoff.
    #[error("resource not found")]
    NotFound,

    /// HTTP 429. `retry_after` carries the server's Retry-After hint when
    /// the header was present and parseable.
    #[error("rate limited by upstream")]
    RateLimited { retry_after: Option<Duration> },

    /// Socket or connection timeout.
    #[error("request timed out")]
    Timeout,

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
