use anyhow::Result;
use clap::Parser;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

mod api;
mod config;
mod db;
mod error;
mod leagues;
mod prefetch;

use api::client::endpoints;
use api::{LogoCache, LogoFetcher, RateLimiter, RetryingExecutor, SportsDbClient};
use config::Config;
use db::Database;
use prefetch::{ApiSeasonProvider, Bootstrapper, MatchWarmer, PrefetchQueue, SportsDbWarmer};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Open database
    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    let client = Arc::new(SportsDbClient::new(&config.api_base_url, &config.api_key)?);

    let mut intervals = HashMap::new();
    intervals.insert(
        endpoints::SEASONS.to_string(),
        Duration::from_millis(config.seasons_interval_ms),
    );
    intervals.insert(
        endpoints::EVENTS.to_string(),
        Duration::from_millis(config.events_interval_ms),
    );
    intervals.insert(
        endpoints::LIVESCORE.to_string(),
        Duration::from_millis(config.livescore_interval_ms),
    );
    let limiter = Arc::new(RateLimiter::new(intervals));

    let executor = Arc::new(RetryingExecutor::new(
        db.clone(),
        Duration::from_millis(config.default_backoff_ms),
    ));
    let logos = Arc::new(LogoCache::new(
        Arc::clone(&client) as Arc<dyn LogoFetcher>,
        Duration::from_millis(config.logo_spacing_ms),
    ));
    let warmer = Arc::new(SportsDbWarmer::new(
        Arc::clone(&client),
        Arc::clone(&executor),
        Arc::clone(&limiter),
        Arc::clone(&logos),
        db.clone(),
    ));
    let seasons = Arc::new(ApiSeasonProvider::new(
        client,
        executor,
        limiter,
        db.clone(),
    ));

    // One token covers every background loop; cancelling it is the whole
    // shutdown story. In-flight queue rows stay queued and resume next run.
    let cancel = CancellationToken::new();

    let queue = Arc::new(PrefetchQueue::new(
        db,
        Arc::clone(&warmer) as Arc<dyn MatchWarmer>,
        Duration::from_millis(config.queue_spacing_ms),
        Duration::from_millis(config.queue_idle_ms),
        Duration::from_millis(config.queue_retry_delay_ms),
        cancel.clone(),
    ));
    queue.start();

    let bootstrapper = Arc::new(Bootstrapper::new(
        leagues::LEAGUES.to_vec(),
        seasons,
        warmer,
        Arc::clone(&queue),
        config.future_seasons_limit,
        config.past_seasons_limit,
        config.live_sport.clone(),
        cancel.clone(),
    ));
    bootstrapper.prefetch_all_data(config.force_refresh);

    // Run until interrupted
    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    cancel.cancel();

    Ok(())
}
