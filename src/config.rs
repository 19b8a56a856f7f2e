use clap::Parser;

/// Football schedule prefetch daemon
#[derive(Parser, Debug, Clone)]
#[command(name = "matchwarm", version, about)]
pub struct Config {
    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "matchwarm.db")]
    pub database_path: String,

    /// Sports-data API base URL
    #[arg(
        long,
        env = "SPORTS_API_URL",
        default_value = "https://www.thesportsdb.com/api/v1/json"
    )]
    pub api_base_url: String,

    /// Sports-data API key ("3" is the public free-tier key)
    #[arg(long, env = "SPORTS_API_KEY", default_value = "3")]
    pub api_key: String,

    /// Sport identifier used for live-score warming
    #[arg(long, env = "LIVE_SPORT", default_value = "Soccer")]
    pub live_sport: String,

    /// Minimum interval between season-list requests (ms)
    #[arg(long, env = "SEASONS_INTERVAL_MS", default_value = "1000")]
    pub seasons_interval_ms: u64,

    /// Minimum interval between season-event requests (ms)
    #[arg(long, env = "EVENTS_INTERVAL_MS", default_value = "1000")]
    pub events_interval_ms: u64,

    /// Minimum interval between livescore requests (ms)
    #[arg(long, env = "LIVESCORE_INTERVAL_MS", default_value = "2000")]
    pub livescore_interval_ms: u64,

    /// Default wait before retrying a rate-limited or timed-out call (ms),
    /// used when the server sends no Retry-After hint
    #[arg(long, env = "DEFAULT_BACKOFF_MS", default_value = "60000")]
    pub default_backoff_ms: u64,

    /// Fixed spacing between dispatched queue tasks (ms)
    #[arg(long, env = "QUEUE_SPACING_MS", default_value = "1500")]
    pub queue_spacing_ms: u64,

    /// Queue poll interval when no task is ready (ms)
    #[arg(long, env = "QUEUE_IDLE_MS", default_value = "5000")]
    pub queue_idle_ms: u64,

    /// Base delay when rescheduling a failed queue task (ms); the actual
    /// delay grows linearly with the attempt count
    #[arg(long, env = "QUEUE_RETRY_DELAY_MS", default_value = "30000")]
    pub queue_retry_delay_ms: u64,

    /// Minimum spacing between team logo fetches (ms)
    #[arg(long, env = "LOGO_SPACING_MS", default_value = "1000")]
    pub logo_spacing_ms: u64,

    /// Upcoming-season tasks enqueued per league beyond the prioritized season
    #[arg(long, env = "FUTURE_SEASONS_LIMIT", default_value = "2")]
    pub future_seasons_limit: usize,

    /// Past-season tasks enqueued per league beyond the prioritized season
    #[arg(long, env = "PAST_SEASONS_LIMIT", default_value = "4")]
    pub past_seasons_limit: usize,

    /// Re-run the warm pass even if data is already cached
    #[arg(long, env = "FORCE_REFRESH", default_value = "false")]
    pub force_refresh: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if url::Url::parse(&self.api_base_url).is_err() {
            anyhow::bail!("api_base_url is not a valid URL: {}", self.api_base_url);
        }
        if self.api_key.is_empty() {
            anyhow::bail!("api_key must not be empty");
        }
        if self.queue_spacing_ms == 0 {
            anyhow::bail!("queue_spacing_ms must be positive");
        }
        if self.queue_idle_ms == 0 {
            anyhow::bail!("queue_idle_ms must be positive");
        }
        if self.queue_retry_delay_ms == 0 {
            anyhow::bail!("queue_retry_delay_ms must be positive");
        }
        if self.default_backoff_ms == 0 {
            anyhow::bail!("default_backoff_ms must be positive");
        }
        Ok(())
    }
}
