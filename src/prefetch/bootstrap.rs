use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::queue::PrefetchQueue;
use super::warm::{MatchWarmer, SeasonProvider};
use crate::db::models::TaskType;
use crate::error::ApiError;
use crate::leagues::League;

/// Orchestrates the initial warm-up across all leagues.
///
/// Each league's most relevant season is warmed synchronously so the data a
/// user sees first is ready almost immediately; everything else goes into
/// the persisted queue, interleaved across leagues so one league with a
/// deep season history cannot starve the others.
pub struct Bootstrapper {
    leagues: Vec<League>,
    seasons: Arc<dyn SeasonProvider>,
    warmer: Arc<dyn MatchWarmer>,
    queue: Arc<PrefetchQueue>,
    future_limit: usize,
    past_limit: usize,
    live_sport: String,
    started: AtomicBool,
    cancel: CancellationToken,
}

struct EnqueueRequest {
    league_id: i64,
    season: String,
    task_type: TaskType,
}

impl Bootstrapper {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        leagues: Vec<League>,
        seasons: Arc<dyn SeasonProvider>,
        warmer: Arc<dyn MatchWarmer>,
        queue: Arc<PrefetchQueue>,
        future_limit: usize,
        past_limit: usize,
        live_sport: String,
        cancel: CancellationToken,
    ) -> Self {
        Bootstrapper {
            leagues,
            seasons,
            warmer,
            queue,
            future_limit,
            past_limit,
            live_sport,
            started: AtomicBool::new(false),
            cancel,
        }
    }

    /// Launch the warm pass on a background task. Unforced calls after the
    /// first are no-ops; forced calls always run.
    pub fn prefetch_all_data(self: &Arc<Self>, force_refresh: bool) {
        if !force_refresh && self.started.swap(true, Ordering::SeqCst) {
            debug!("warm pass already started, skipping");
            return;
        }
        self.started.store(true, Ordering::SeqCst);

        let bootstrapper = Arc::clone(self);
        tokio::spawn(async move { bootstrapper.run(force_refresh).await });
    }

    /// One full warm pass. Failures are contained per league, per season
    /// and per warm call; nothing here aborts the pass.
    pub(crate) async fn run(&self, force_refresh: bool) {
        info!(
            leagues = self.leagues.len(),
            force_refresh, "starting warm pass"
        );

        let mut backlog: Vec<Vec<EnqueueRequest>> = Vec::new();
        for league in &self.leagues {
            if self.cancel.is_cancelled() {
                info!("warm pass cancelled");
                return;
            }
            match self.warm_league(league, force_refresh).await {
                Ok(requests) => backlog.push(requests),
                Err(e) => warn!(league = league.name, error = %e, "skipping league"),
            }
        }

        self.enqueue_round_robin(&backlog, force_refresh);

        if let Err(e) = self.warmer.warm_live_matches(&self.live_sport).await {
            warn!(error = %e, "live warm failed");
        }
        info!("warm pass finished");
    }

    /// Warm the league's prioritized season now and return the enqueue
    /// requests for its remaining seasons.
    async fn warm_league(
        &self,
        league: &League,
        force_refresh: bool,
    ) -> Result<Vec<EnqueueRequest>, ApiError> {
        let seasons = self.seasons.get_seasons(league.id).await?;
        let Some((prioritized, rest)) = seasons.split_first() else {
            debug!(league = league.name, "no seasons listed");
            return Ok(Vec::new());
        };

        // Synchronous and best-effort: a failure here only costs latency,
        // the queue never sees the prioritized season.
        if let Err(e) = self
            .warmer
            .warm_upcoming_matches(league.id, &prioritized.name, force_refresh, false)
            .await
        {
            warn!(
                league = league.name,
                season = %prioritized.name,
                error = %e,
                "prioritized upcoming warm failed"
            );
        }
        if let Err(e) = self
            .warmer
            .warm_recent_matches(league.id, &prioritized.name, force_refresh, false)
            .await
        {
            warn!(
                league = league.name,
                season = %prioritized.name,
                error = %e,
                "prioritized recent warm failed"
            );
        }

        let mut requests = Vec::new();
        for season in rest.iter().take(self.future_limit) {
            requests.push(EnqueueRequest {
                league_id: league.id,
                season: season.name.clone(),
                task_type: TaskType::Upcoming,
            });
        }
        for season in rest.iter().take(self.past_limit) {
            requests.push(EnqueueRequest {
                league_id: league.id,
                season: season.name.clone(),
                task_type: TaskType::Past,
            });
        }
        Ok(requests)
    }

    /// Interleave enqueues across leagues: every league gets its first
    /// backlog season queued before any league gets its second.
    fn enqueue_round_robin(&self, backlog: &[Vec<EnqueueRequest>], force_refresh: bool) {
        let longest = backlog.iter().map(Vec::len).max().unwrap_or(0);
        for position in 0..longest {
            for league_requests in backlog {
                let Some(request) = league_requests.get(position) else {
                    continue;
                };
                let result = match request.task_type {
                    TaskType::Upcoming => self.queue.enqueue_upcoming(
                        request.league_id,
                        &request.season,
                        force_refresh,
                    ),
                    TaskType::Past => self.queue.enqueue_past(
                        request.league_id,
                        &request.season,
                        force_refresh,
                    ),
                };
                if let Err(e) = result {
                    warn!(
                        league_id = request.league_id,
                        season = %request.season,
                        error = %e,
                        "enqueue failed"
                    );
                }
            }
        }
    }
}
