use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::warm::MatchWarmer;
use crate::db::models::{PrefetchTask, TaskType};
use crate::db::Database;
use crate::error::ApiError;

/// Priority assigned to forced enqueues; normal enqueues use 0.
pub const FORCE_PRIORITY: i64 = 100;

/// Durable warm-up queue.
///
/// One row exists per (league, season, type); re-enqueueing promotes the
/// existing row instead of duplicating it. `start` spawns a single drain
/// loop that dispatches ready tasks one at a time with a fixed spacing
/// sleep between dispatches, so a backlog of ready tasks never turns into
/// a request burst regardless of per-endpoint limiting.
pub struct PrefetchQueue {
    db: Database,
    warmer: Arc<dyn MatchWarmer>,
    spacing: Duration,
    idle: Duration,
    base_retry_delay: Duration,
    started: AtomicBool,
    cancel: CancellationToken,
}

impl PrefetchQueue {
    pub fn new(
        db: Database,
        warmer: Arc<dyn MatchWarmer>,
        spacing: Duration,
        idle: Duration,
        base_retry_delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        PrefetchQueue {
            db,
            warmer,
            spacing,
            idle,
            base_retry_delay,
            started: AtomicBool::new(false),
            cancel,
        }
    }

    pub fn enqueue_upcoming(
        &self,
        league_id: i64,
        season: &str,
        force_refresh: bool,
    ) -> Result<(), ApiError> {
        self.enqueue(league_id, season, TaskType::Upcoming, force_refresh)
    }

    pub fn enqueue_past(
        &self,
        league_id: i64,
        season: &str,
        force_refresh: bool,
    ) -> Result<(), ApiError> {
        self.enqueue(league_id, season, TaskType::Past, force_refresh)
    }

    fn enqueue(
        &self,
        league_id: i64,
        season: &str,
        task_type: TaskType,
        force_refresh: bool,
    ) -> Result<(), ApiError> {
        let priority = if force_refresh { FORCE_PRIORITY } else { 0 };
        self.db.enqueue_task(
            league_id,
            season,
            task_type,
            force_refresh,
            priority,
            Utc::now().timestamp_millis(),
        )?;
        debug!(
            league_id,
            season,
            task_type = task_type.as_str(),
            force_refresh,
            "task enqueued"
        );
        Ok(())
    }

    /// Spawn the drain loop. Subsequent calls are no-ops.
    pub fn start(self: &Arc<Self>) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let queue = Arc::clone(self);
        tokio::spawn(async move { queue.drain_loop().await });
    }

    async fn drain_loop(&self) {
        info!("prefetch queue drain loop started");
        loop {
            let pause = match self.process_next().await {
                Ok(true) => self.spacing,
                Ok(false) => self.idle,
                Err(e) => {
                    error!(error = %e, "queue iteration failed");
                    self.idle
                }
            };
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }
        info!("prefetch queue drain loop stopped");
    }

    /// Dispatch the highest-priority ready task, if any. Returns whether a
    /// task was dispatched. A crash mid-execution leaves the row queued, so
    /// the task re-runs after a restart.
    pub(crate) async fn process_next(&self) -> Result<bool, ApiError> {
        let Some(task) = self.db.peek_ready_task(Utc::now().timestamp_millis())? else {
            return Ok(false);
        };
        debug!(
            id = task.id,
            league_id = task.league_id,
            season = %task.season,
            task_type = task.task_type.as_str(),
            priority = task.priority,
            attempts = task.attempts,
            "dispatching task"
        );

        match self.run_task(&task).await {
            Ok(()) => {
                self.db.delete_task(task.id)?;
                info!(
                    league_id = task.league_id,
                    season = %task.season,
                    task_type = task.task_type.as_str(),
                    "task completed"
                );
            }
            Err(ApiError::NotFound) => {
                // The season doesn't exist upstream; retrying can't fix it.
                self.db.delete_task(task.id)?;
                warn!(
                    league_id = task.league_id,
                    season = %task.season,
                    "task target not found, dropping"
                );
            }
            Err(e) => {
                self.db.reschedule_task(
                    task.id,
                    Utc::now().timestamp_millis(),
                    self.base_retry_delay.as_millis() as i64,
                )?;
                warn!(
                    league_id = task.league_id,
                    season = %task.season,
                    attempts = task.attempts + 1,
                    error = %e,
                    "task failed, rescheduled"
                );
            }
        }
        Ok(true)
    }

    async fn run_task(&self, task: &PrefetchTask) -> Result<(), ApiError> {
        match task.task_type {
            TaskType::Upcoming => {
                self.warmer
                    .warm_upcoming_matches(task.league_id, &task.season, task.force_refresh, true)
                    .await
            }
            TaskType::Past => {
                self.warmer
                    .warm_recent_matches(task.league_id, &task.season, task.force_refresh, true)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Warmer stub that records calls and plays back scripted results.
    struct ScriptedWarmer {
        calls: Mutex<Vec<(TaskType, i64, String, bool)>>,
        script: Mutex<VecDeque<Result<(), ApiError>>>,
    }

    impl ScriptedWarmer {
        fn new(script: Vec<Result<(), ApiError>>) -> Arc<Self> {
            Arc::new(ScriptedWarmer {
                calls: Mutex::new(Vec::new()),
                script: Mutex::new(script.into()),
            })
        }

        fn next_result(&self) -> Result<(), ApiError> {
            self.script.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }
    }

    #[async_trait]
    impl MatchWarmer for ScriptedWarmer {
        async fn warm_upcoming_matches(
            &self,
            league_id: i64,
            season: &str,
            force_refresh: bool,
            _prefetch_logos: bool,
        ) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push((
                TaskType::Upcoming,
                league_id,
                season.to_string(),
                force_refresh,
            ));
            self.next_result()
        }

        async fn warm_recent_matches(
            &self,
            league_id: i64,
            season: &str,
            force_refresh: bool,
            _prefetch_logos: bool,
        ) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push((
                TaskType::Past,
                league_id,
                season.to_string(),
                force_refresh,
            ));
            self.next_result()
        }

        async fn warm_live_matches(&self, _sport: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn queue_with(warmer: Arc<ScriptedWarmer>) -> (Arc<PrefetchQueue>, Database) {
        let db = Database::open(":memory:").unwrap();
        let queue = Arc::new(PrefetchQueue::new(
            db.clone(),
            warmer,
            Duration::from_millis(100),
            Duration::from_millis(1_000),
            Duration::from_millis(5_000),
            CancellationToken::new(),
        ));
        (queue, db)
    }

    #[tokio::test]
    async fn test_successful_task_is_deleted() {
        let warmer = ScriptedWarmer::new(vec![Ok(())]);
        let (queue, db) = queue_with(Arc::clone(&warmer));

        queue.enqueue_upcoming(4328, "2024-2025", false).unwrap();
        assert!(queue.process_next().await.unwrap());

        assert!(db.list_tasks().unwrap().is_empty());
        let calls = warmer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (TaskType::Upcoming, 4328, "2024-2025".into(), false));
    }

    #[tokio::test]
    async fn test_past_task_dispatches_recent_warm() {
        let warmer = ScriptedWarmer::new(vec![Ok(())]);
        let (queue, _db) = queue_with(Arc::clone(&warmer));

        queue.enqueue_past(4328, "2023-2024", true).unwrap();
        assert!(queue.process_next().await.unwrap());

        let calls = warmer.calls.lock().unwrap();
        assert_eq!(calls[0], (TaskType::Past, 4328, "2023-2024".into(), true));
    }

    #[tokio::test]
    async fn test_empty_queue_reports_no_dispatch() {
        let warmer = ScriptedWarmer::new(vec![]);
        let (queue, _db) = queue_with(warmer);
        assert!(!queue.process_next().await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_task_is_rescheduled_not_dropped() {
        let warmer = ScriptedWarmer::new(vec![
            Err(ApiError::Timeout),
            Err(ApiError::Timeout),
            Err(ApiError::Timeout),
        ]);
        let (queue, db) = queue_with(Arc::clone(&warmer));

        queue.enqueue_upcoming(4328, "2024-2025", false).unwrap();

        for expected_attempts in 1..=3i64 {
            let before = Utc::now().timestamp_millis();
            assert!(queue.process_next().await.unwrap());

            let task = db
                .get_task(4328, "2024-2025", TaskType::Upcoming)
                .unwrap()
                .expect("task must survive failures");
            assert_eq!(task.attempts, expected_attempts);
            let min_delay = 5_000 * expected_attempts;
            assert!(task.available_after >= before + min_delay);
            assert!(task.available_after <= Utc::now().timestamp_millis() + min_delay);

            db.force_task_ready(task.id).unwrap();
        }
    }

    #[tokio::test]
    async fn test_not_found_task_is_dropped() {
        let warmer = ScriptedWarmer::new(vec![Err(ApiError::NotFound)]);
        let (queue, db) = queue_with(Arc::clone(&warmer));

        queue.enqueue_upcoming(4328, "1990-1991", false).unwrap();
        assert!(queue.process_next().await.unwrap());

        assert!(db.list_tasks().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_forced_enqueue_uses_force_priority() {
        let warmer = ScriptedWarmer::new(vec![]);
        let (queue, db) = queue_with(warmer);

        queue.enqueue_upcoming(1, "2024-2025", false).unwrap();
        queue.enqueue_upcoming(2, "2024-2025", true).unwrap();

        // The forced task jumps the line despite being enqueued later.
        let task = db
            .peek_ready_task(Utc::now().timestamp_millis())
            .unwrap()
            .unwrap();
        assert_eq!(task.league_id, 2);
        assert_eq!(task.priority, FORCE_PRIORITY);
    }

    #[tokio::test]
    async fn test_duplicate_enqueue_promotes_single_row() {
        let warmer = ScriptedWarmer::new(vec![]);
        let (queue, db) = queue_with(warmer);

        queue.enqueue_upcoming(1, "2024-2025", false).unwrap();
        queue.enqueue_upcoming(1, "2024-2025", true).unwrap();

        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].force_refresh);
        assert_eq!(tasks[0].priority, FORCE_PRIORITY);
        assert_eq!(tasks[0].attempts, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_loop_processes_and_stops_on_cancel() {
        let warmer = ScriptedWarmer::new(vec![Ok(()), Ok(())]);
        let db = Database::open(":memory:").unwrap();
        let cancel = CancellationToken::new();
        let queue = Arc::new(PrefetchQueue::new(
            db.clone(),
            Arc::clone(&warmer) as Arc<dyn MatchWarmer>,
            Duration::from_millis(100),
            Duration::from_millis(1_000),
            Duration::from_millis(5_000),
            cancel.clone(),
        ));

        queue.enqueue_upcoming(1, "2024-2025", false).unwrap();
        queue.enqueue_past(1, "2024-2025", false).unwrap();

        queue.start();
        // Second start is a no-op (one drain loop per process).
        queue.start();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(db.list_tasks().unwrap().is_empty());
        assert_eq!(warmer.calls.lock().unwrap().len(), 2);

        cancel.cancel();
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
}
