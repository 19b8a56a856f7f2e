use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tracing::{debug, info};

use crate::api::client::{endpoints, SportsDbClient};
use crate::api::logos::LogoCache;
use crate::api::rate_limit::RateLimiter;
use crate::api::retry::{retry_with_backoff, RetryingExecutor};
use crate::db::models::{Match, MatchStatus, Season, TaskType};
use crate::db::Database;
use crate::error::ApiError;

/// Season catalog lookup for a league.
#[async_trait]
pub trait SeasonProvider: Send + Sync {
    /// Seasons for a league, most recent first.
    async fn get_seasons(&self, league_id: i64) -> Result<Vec<Season>, ApiError>;
}

/// Warms one (league, season) partition of the local match store, or the
/// live snapshot. Implementations persist results as a side effect; errors
/// propagate to the caller for containment there.
#[async_trait]
pub trait MatchWarmer: Send + Sync {
    async fn warm_upcoming_matches(
        &self,
        league_id: i64,
        season: &str,
        force_refresh: bool,
        prefetch_logos: bool,
    ) -> Result<(), ApiError>;

    async fn warm_recent_matches(
        &self,
        league_id: i64,
        season: &str,
        force_refresh: bool,
        prefetch_logos: bool,
    ) -> Result<(), ApiError>;

    async fn warm_live_matches(&self, sport: &str) -> Result<(), ApiError>;
}

/// API-backed season source. Every call goes through the durable executor
/// and the per-endpoint rate limiter, and refreshes the local season list.
pub struct ApiSeasonProvider {
    client: Arc<SportsDbClient>,
    executor: Arc<RetryingExecutor>,
    limiter: Arc<RateLimiter>,
    db: Database,
}

impl ApiSeasonProvider {
    pub fn new(
        client: Arc<SportsDbClient>,
        executor: Arc<RetryingExecutor>,
        limiter: Arc<RateLimiter>,
        db: Database,
    ) -> Self {
        ApiSeasonProvider {
            client,
            executor,
            limiter,
            db,
        }
    }
}

#[async_trait]
impl SeasonProvider for ApiSeasonProvider {
    async fn get_seasons(&self, league_id: i64) -> Result<Vec<Season>, ApiError> {
        let mut seasons = self
            .executor
            .execute(endpoints::SEASONS, || {
                self.limiter
                    .run(endpoints::SEASONS, || self.client.get_seasons(league_id))
            })
            .await?;
        // The API lists oldest first; callers treat the head as the season
        // to prioritize.
        seasons.sort_by(|a, b| b.name.cmp(&a.name));
        self.db.replace_seasons(league_id, &seasons)?;
        Ok(seasons)
    }
}

/// Warms match partitions from the season-events endpoint.
pub struct SportsDbWarmer {
    client: Arc<SportsDbClient>,
    executor: Arc<RetryingExecutor>,
    limiter: Arc<RateLimiter>,
    logos: Arc<LogoCache>,
    db: Database,
}

impl SportsDbWarmer {
    pub fn new(
        client: Arc<SportsDbClient>,
        executor: Arc<RetryingExecutor>,
        limiter: Arc<RateLimiter>,
        logos: Arc<LogoCache>,
        db: Database,
    ) -> Self {
        SportsDbWarmer {
            client,
            executor,
            limiter,
            logos,
            db,
        }
    }

    async fn warm_partition(
        &self,
        league_id: i64,
        season: &str,
        bucket: TaskType,
        force_refresh: bool,
        prefetch_logos: bool,
    ) -> Result<(), ApiError> {
        if !force_refresh && self.db.has_matches(league_id, season, bucket)? {
            debug!(
                league_id,
                season,
                bucket = bucket.as_str(),
                "partition already warm, skipping"
            );
            return Ok(());
        }

        let events = self
            .executor
            .execute(endpoints::EVENTS, || {
                self.limiter.run(endpoints::EVENTS, || {
                    self.client.get_season_events(league_id, season)
                })
            })
            .await?;

        let now = Utc::now();
        let selected: Vec<Match> = events
            .into_iter()
            .filter(|m| match bucket {
                TaskType::Upcoming => is_upcoming(m, now),
                TaskType::Past => !is_upcoming(m, now),
            })
            .collect();

        self.db.replace_matches(league_id, season, bucket, &selected)?;
        info!(
            league_id,
            season,
            bucket = bucket.as_str(),
            count = selected.len(),
            "partition warmed"
        );

        if prefetch_logos {
            self.prefetch_logos(&selected).await;
        }
        Ok(())
    }

    async fn prefetch_logos(&self, matches: &[Match]) {
        let team_ids: HashSet<i64> = matches
            .iter()
            .flat_map(|m| [m.home_team_id, m.away_team_id])
            .flatten()
            .collect();
        // The logo throttle spaces these out; issuing them together is fine.
        join_all(team_ids.into_iter().map(|id| self.logos.get_logo(id))).await;
    }
}

#[async_trait]
impl MatchWarmer for SportsDbWarmer {
    async fn warm_upcoming_matches(
        &self,
        league_id: i64,
        season: &str,
        force_refresh: bool,
        prefetch_logos: bool,
    ) -> Result<(), ApiError> {
        self.warm_partition(league_id, season, TaskType::Upcoming, force_refresh, prefetch_logos)
            .await
    }

    async fn warm_recent_matches(
        &self,
        league_id: i64,
        season: &str,
        force_refresh: bool,
        prefetch_logos: bool,
    ) -> Result<(), ApiError> {
        self.warm_partition(league_id, season, TaskType::Past, force_refresh, prefetch_logos)
            .await
    }

    async fn warm_live_matches(&self, sport: &str) -> Result<(), ApiError> {
        // A live snapshot is stale within seconds; a short bounded retry
        // beats a durable backoff here.
        let games = retry_with_backoff(3, Duration::from_millis(500), || {
            self.limiter
                .run(endpoints::LIVESCORE, || self.client.get_livescores(sport))
        })
        .await?;
        self.db.replace_live_matches(sport, &games)?;
        info!(sport, count = games.len(), "live snapshot warmed");
        Ok(())
    }
}

fn is_upcoming(m: &Match, now: DateTime<Utc>) -> bool {
    match m.status {
        MatchStatus::NotStarted => true,
        MatchStatus::Finished => false,
        // Odd states (postponed fixtures sometimes report in-progress):
        // bucket by kickoff when one is known.
        MatchStatus::InProgress | MatchStatus::HalfTime => {
            m.kickoff_at.map_or(false, |kickoff| kickoff > now)
        }
    }
}
