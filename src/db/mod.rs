use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::sync::{Arc, Mutex};

pub mod models;
use models::*;

/// Thread-safe SQLite handle (single connection with mutex).
///
/// This is the single source of truth across restarts: queued prefetch
/// tasks and pending retry backoffs live here, so a killed process resumes
/// exactly where it left off.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent).
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ── Prefetch tasks ────────────────────────────────────────────────────────

    /// Enqueue a warm-up task, or promote the existing row for the same
    /// (league, season, type) key.
    ///
    /// Merge semantics on conflict: force_refresh is OR-ed, priority is
    /// MAX-ed, available_after is MIN-ed (an already-queued task is never
    /// delayed by a re-enqueue), and attempts reset to zero when the new
    /// request is forced.
    pub fn enqueue_task(
        &self,
        league_id: i64,
        season: &str,
        task_type: TaskType,
        force_refresh: bool,
        priority: i64,
        available_after: i64,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO prefetch_tasks (
                league_id, season, task_type, force_refresh,
                priority, available_after, attempts, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)
             ON CONFLICT(league_id, season, task_type) DO UPDATE SET
                force_refresh   = MAX(force_refresh, excluded.force_refresh),
                priority        = MAX(priority, excluded.priority),
                available_after = MIN(available_after, excluded.available_after),
                attempts        = CASE WHEN excluded.force_refresh THEN 0 ELSE attempts END",
            params![
                league_id,
                season,
                task_type.as_str(),
                force_refresh,
                priority,
                available_after,
                Utc::now(),
            ],
        )?;
        Ok(())
    }

    /// The highest-priority task whose dispatch time has arrived, if any.
    /// Ties break on earliest available_after, then insertion order.
    pub fn peek_ready_task(&self, now_ms: i64) -> Result<Option<PrefetchTask>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, league_id, season, task_type, force_refresh,
                    priority, available_after, attempts, created_at
             FROM prefetch_tasks
             WHERE available_after <= ?1
             ORDER BY priority DESC, available_after ASC, id ASC
             LIMIT 1",
            params![now_ms],
            map_task,
        )
        .optional()
    }

    /// Fetch a task row by key (promotion checks, tests).
    pub fn get_task(
        &self,
        league_id: i64,
        season: &str,
        task_type: TaskType,
    ) -> Result<Option<PrefetchTask>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, league_id, season, task_type, force_refresh,
                    priority, available_after, attempts, created_at
             FROM prefetch_tasks
             WHERE league_id = ?1 AND season = ?2 AND task_type = ?3",
            params![league_id, season, task_type.as_str()],
            map_task,
        )
        .optional()
    }

    /// All tasks in insertion order.
    pub fn list_tasks(&self) -> Result<Vec<PrefetchTask>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, league_id, season, task_type, force_refresh,
                    priority, available_after, attempts, created_at
             FROM prefetch_tasks ORDER BY id ASC",
        )?;
        let tasks = stmt
            .query_map([], map_task)?
            .collect::<Result<Vec<_>>>()?;
        Ok(tasks)
    }

    pub fn delete_task(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM prefetch_tasks WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Push a failed task back with a linearly growing delay: the n-th
    /// consecutive failure lands at `now + base_delay * n`.
    pub fn reschedule_task(&self, id: i64, now_ms: i64, base_delay_ms: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        // Both SET expressions see the pre-update row, so available_after
        // uses the incremented attempt count.
        conn.execute(
            "UPDATE prefetch_tasks
             SET available_after = ?2 + ?3 * (attempts + 1),
                 attempts        = attempts + 1
             WHERE id = ?1",
            params![id, now_ms, base_delay_ms],
        )?;
        Ok(())
    }

    // ── Retry backoff state ──────────────────────────────────────────────────

    /// Pending backoff deadline (epoch ms) for an endpoint, if one exists.
    pub fn get_retry_state(&self, endpoint: &str) -> Result<Option<i64>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT next_attempt_at FROM retry_state WHERE endpoint = ?1",
            params![endpoint],
            |row| row.get(0),
        )
        .optional()
    }

    /// Record the next permitted attempt time, overwriting any prior value.
    pub fn set_retry_state(&self, endpoint: &str, next_attempt_at: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO retry_state (endpoint, next_attempt_at) VALUES (?1, ?2)
             ON CONFLICT(endpoint) DO UPDATE SET next_attempt_at = excluded.next_attempt_at",
            params![endpoint, next_attempt_at],
        )?;
        Ok(())
    }

    pub fn clear_retry_state(&self, endpoint: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM retry_state WHERE endpoint = ?1",
            params![endpoint],
        )?;
        Ok(())
    }

    // ── Seasons ──────────────────────────────────────────────────────────────

    /// Replace the season list for a league wholesale.
    pub fn replace_seasons(&self, league_id: i64, seasons: &[Season]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM seasons WHERE league_id = ?1",
            params![league_id],
        )?;
        for season in seasons {
            tx.execute(
                "INSERT INTO seasons (league_id, season, fetched_at) VALUES (?1, ?2, ?3)",
                params![league_id, season.name, Utc::now()],
            )?;
        }
        tx.commit()
    }

    pub fn list_seasons(&self, league_id: i64) -> Result<Vec<Season>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT season FROM seasons WHERE league_id = ?1 ORDER BY season DESC",
        )?;
        let seasons = stmt
            .query_map(params![league_id], |row| {
                Ok(Season { name: row.get(0)? })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(seasons)
    }

    // ── Matches ──────────────────────────────────────────────────────────────

    /// Replace one (league, season, bucket) partition wholesale.
    pub fn replace_matches(
        &self,
        league_id: i64,
        season: &str,
        bucket: TaskType,
        matches: &[Match],
    ) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM matches WHERE league_id = ?1 AND season = ?2 AND bucket = ?3",
            params![league_id, season, bucket.as_str()],
        )?;
        for m in matches {
            tx.execute(
                "INSERT OR REPLACE INTO matches (
                    event_id, league_id, season, bucket,
                    home_team, away_team, home_team_id, away_team_id,
                    home_score, away_score, kickoff_at, status, fetched_at
                 ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
                params![
                    m.event_id,
                    m.league_id,
                    m.season,
                    bucket.as_str(),
                    m.home_team,
                    m.away_team,
                    m.home_team_id,
                    m.away_team_id,
                    m.home_score,
                    m.away_score,
                    m.kickoff_at,
                    m.status.as_str(),
                    Utc::now(),
                ],
            )?;
        }
        tx.commit()
    }

    /// Whether a partition already holds any rows.
    pub fn has_matches(&self, league_id: i64, season: &str, bucket: TaskType) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM matches WHERE league_id = ?1 AND season = ?2 AND bucket = ?3
             )",
            params![league_id, season, bucket.as_str()],
            |row| row.get(0),
        )
    }

    pub fn list_matches(
        &self,
        league_id: i64,
        season: &str,
        bucket: TaskType,
    ) -> Result<Vec<Match>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT event_id, league_id, season, home_team, away_team,
                    home_team_id, away_team_id, home_score, away_score,
                    kickoff_at, status
             FROM matches
             WHERE league_id = ?1 AND season = ?2 AND bucket = ?3
             ORDER BY kickoff_at ASC",
        )?;
        let matches = stmt
            .query_map(params![league_id, season, bucket.as_str()], map_match)?
            .collect::<Result<Vec<_>>>()?;
        Ok(matches)
    }

    // ── Live matches ─────────────────────────────────────────────────────────

    /// Replace the live snapshot for a sport wholesale.
    pub fn replace_live_matches(&self, sport: &str, games: &[LiveMatch]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM live_matches WHERE sport = ?1",
            params![sport],
        )?;
        for g in games {
            tx.execute(
                "INSERT OR REPLACE INTO live_matches (
                    event_id, sport, league, home_team, away_team,
                    home_score, away_score, minute, status, fetched_at
                 ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
                params![
                    g.event_id,
                    g.sport,
                    g.league,
                    g.home_team,
                    g.away_team,
                    g.home_score,
                    g.away_score,
                    g.minute,
                    g.status.as_str(),
                    Utc::now(),
                ],
            )?;
        }
        tx.commit()
    }

    pub fn list_live_matches(&self, sport: &str) -> Result<Vec<LiveMatch>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT event_id, sport, league, home_team, away_team,
                    home_score, away_score, minute, status
             FROM live_matches WHERE sport = ?1 ORDER BY event_id ASC",
        )?;
        let games = stmt
            .query_map(params![sport], |row| {
                let status: String = row.get(8)?;
                Ok(LiveMatch {
                    event_id: row.get(0)?,
                    sport: row.get(1)?,
                    league: row.get(2)?,
                    home_team: row.get(3)?,
                    away_team: row.get(4)?,
                    home_score: row.get(5)?,
                    away_score: row.get(6)?,
                    minute: row.get(7)?,
                    status: parse_status(8, &status)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(games)
    }
}

#[cfg(test)]
impl Database {
    /// Make a task immediately dispatchable regardless of its backoff.
    pub fn force_task_ready(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE prefetch_tasks SET available_after = 0 WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

fn map_task(row: &rusqlite::Row) -> Result<PrefetchTask> {
    let type_str: String = row.get(3)?;
    Ok(PrefetchTask {
        id: row.get(0)?,
        league_id: row.get(1)?,
        season: row.get(2)?,
        task_type: TaskType::parse(&type_str).ok_or_else(|| conversion_error(3, &type_str))?,
        force_refresh: row.get(4)?,
        priority: row.get(5)?,
        available_after: row.get(6)?,
        attempts: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn map_match(row: &rusqlite::Row) -> Result<Match> {
    let status: String = row.get(10)?;
    Ok(Match {
        event_id: row.get(0)?,
        league_id: row.get(1)?,
        season: row.get(2)?,
        home_team: row.get(3)?,
        away_team: row.get(4)?,
        home_team_id: row.get(5)?,
        away_team_id: row.get(6)?,
        home_score: row.get(7)?,
        away_score: row.get(8)?,
        kickoff_at: row.get(9)?,
        status: parse_status(10, &status)?,
    })
}

fn parse_status(column: usize, s: &str) -> Result<MatchStatus> {
    MatchStatus::parse(s).ok_or_else(|| conversion_error(column, s))
}

fn conversion_error(column: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        format!("unrecognized value '{value}'").into(),
    )
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS prefetch_tasks (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    league_id       INTEGER NOT NULL,
    season          TEXT    NOT NULL,
    task_type       TEXT    NOT NULL,
    force_refresh   INTEGER NOT NULL DEFAULT 0,
    priority        INTEGER NOT NULL DEFAULT 0,
    available_after INTEGER NOT NULL,
    attempts        INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT    NOT NULL,
    UNIQUE (league_id, season, task_type)
);

CREATE TABLE IF NOT EXISTS retry_state (
    endpoint        TEXT PRIMARY KEY,
    next_attempt_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS seasons (
    league_id  INTEGER NOT NULL,
    season     TEXT    NOT NULL,
    fetched_at TEXT    NOT NULL,
    UNIQUE (league_id, season)
);

CREATE TABLE IF NOT EXISTS matches (
    event_id     TEXT    NOT NULL,
    league_id    INTEGER NOT NULL,
    season       TEXT    NOT NULL,
    bucket       TEXT    NOT NULL,
    home_team    TEXT    NOT NULL,
    away_team    TEXT    NOT NULL,
    home_team_id INTEGER,
    away_team_id INTEGER,
    home_score   INTEGER,
    away_score   INTEGER,
    kickoff_at   TEXT,
    status       TEXT    NOT NULL,
    fetched_at   TEXT    NOT NULL,
    PRIMARY KEY (event_id, bucket)
);

CREATE TABLE IF NOT EXISTS live_matches (
    event_id   TEXT    NOT NULL,
    sport      TEXT    NOT NULL,
    league     TEXT    NOT NULL,
    home_team  TEXT    NOT NULL,
    away_team  TEXT    NOT NULL,
    home_score INTEGER NOT NULL,
    away_score INTEGER NOT NULL,
    minute     INTEGER,
    status     TEXT    NOT NULL,
    fetched_at TEXT    NOT NULL,
    PRIMARY KEY (event_id, sport)
);

CREATE INDEX IF NOT EXISTS idx_tasks_ready ON prefetch_tasks(available_after, priority);
CREATE INDEX IF NOT EXISTS idx_matches_partition ON matches(league_id, season, bucket);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn open_db() -> Database {
        Database::open(":memory:").unwrap()
    }

    fn sample_match(event_id: &str, league_id: i64, season: &str) -> Match {
        Match {
            event_id: event_id.to_string(),
            league_id,
            season: season.to_string(),
            home_team: "Arsenal".into(),
            away_team: "Chelsea".into(),
            home_team_id: Some(133604),
            away_team_id: Some(133610),
            home_score: None,
            away_score: None,
            kickoff_at: None,
            status: MatchStatus::NotStarted,
        }
    }

    #[test]
    fn test_enqueue_dedup_single_row() {
        let db = open_db();
        db.enqueue_task(1, "2024-2025", TaskType::Upcoming, false, 0, 100)
            .unwrap();
        db.enqueue_task(1, "2024-2025", TaskType::Upcoming, false, 0, 100)
            .unwrap();
        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].created_at <= Utc::now());
    }

    #[test]
    fn test_enqueue_distinct_types_are_distinct_rows() {
        let db = open_db();
        db.enqueue_task(1, "2024-2025", TaskType::Upcoming, false, 0, 100)
            .unwrap();
        db.enqueue_task(1, "2024-2025", TaskType::Past, false, 0, 100)
            .unwrap();
        assert_eq!(db.list_tasks().unwrap().len(), 2);
    }

    #[test]
    fn test_promotion_merges_instead_of_duplicating() {
        let db = open_db();
        db.enqueue_task(1, "2024-2025", TaskType::Upcoming, false, 0, 500)
            .unwrap();
        // Simulate accumulated failures before the promotion arrives.
        let id = db
            .get_task(1, "2024-2025", TaskType::Upcoming)
            .unwrap()
            .unwrap()
            .id;
        db.reschedule_task(id, 1_000, 100).unwrap();
        db.reschedule_task(id, 1_000, 100).unwrap();

        db.enqueue_task(1, "2024-2025", TaskType::Upcoming, true, 100, 200)
            .unwrap();

        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        let task = &tasks[0];
        assert!(task.force_refresh);
        assert_eq!(task.priority, 100);
        assert_eq!(task.available_after, 200);
        assert_eq!(task.attempts, 0, "forced promote resets attempts");
    }

    #[test]
    fn test_promotion_is_monotonic() {
        let db = open_db();
        db.enqueue_task(1, "2024-2025", TaskType::Upcoming, true, 100, 200)
            .unwrap();
        // A later, lower-priority enqueue must not demote or delay the row.
        db.enqueue_task(1, "2024-2025", TaskType::Upcoming, false, 0, 900)
            .unwrap();

        let task = db
            .get_task(1, "2024-2025", TaskType::Upcoming)
            .unwrap()
            .unwrap();
        assert!(task.force_refresh);
        assert_eq!(task.priority, 100);
        assert_eq!(task.available_after, 200);
    }

    #[test]
    fn test_unforced_promote_keeps_attempts() {
        let db = open_db();
        db.enqueue_task(1, "2024-2025", TaskType::Upcoming, false, 0, 100)
            .unwrap();
        let id = db
            .get_task(1, "2024-2025", TaskType::Upcoming)
            .unwrap()
            .unwrap()
            .id;
        db.reschedule_task(id, 1_000, 100).unwrap();

        db.enqueue_task(1, "2024-2025", TaskType::Upcoming, false, 0, 50)
            .unwrap();
        let task = db
            .get_task(1, "2024-2025", TaskType::Upcoming)
            .unwrap()
            .unwrap();
        assert_eq!(task.attempts, 1);
        assert_eq!(task.available_after, 50);
    }

    #[test]
    fn test_peek_orders_by_priority_then_availability_then_insertion() {
        let db = open_db();
        db.enqueue_task(1, "a", TaskType::Upcoming, false, 0, 300).unwrap();
        db.enqueue_task(2, "b", TaskType::Upcoming, false, 5, 400).unwrap();
        db.enqueue_task(3, "c", TaskType::Upcoming, false, 5, 200).unwrap();
        db.enqueue_task(4, "d", TaskType::Upcoming, false, 5, 200).unwrap();

        // Highest priority wins; among those, earliest available_after; then id.
        let first = db.peek_ready_task(1_000).unwrap().unwrap();
        assert_eq!(first.league_id, 3);

        db.delete_task(first.id).unwrap();
        let second = db.peek_ready_task(1_000).unwrap().unwrap();
        assert_eq!(second.league_id, 4);
    }

    #[test]
    fn test_peek_skips_not_yet_available() {
        let db = open_db();
        db.enqueue_task(1, "a", TaskType::Upcoming, false, 100, 5_000)
            .unwrap();
        db.enqueue_task(2, "b", TaskType::Upcoming, false, 0, 100)
            .unwrap();

        // The high-priority task is not ready yet, so the low one dispatches.
        let task = db.peek_ready_task(1_000).unwrap().unwrap();
        assert_eq!(task.league_id, 2);
        assert!(db.peek_ready_task(50).unwrap().is_none());
    }

    #[test]
    fn test_reschedule_grows_linearly() {
        let db = open_db();
        db.enqueue_task(1, "2024-2025", TaskType::Upcoming, false, 0, 0)
            .unwrap();
        let id = db
            .get_task(1, "2024-2025", TaskType::Upcoming)
            .unwrap()
            .unwrap()
            .id;

        for expected_attempts in 1..=3i64 {
            db.reschedule_task(id, 10_000, 1_000).unwrap();
            let task = db
                .get_task(1, "2024-2025", TaskType::Upcoming)
                .unwrap()
                .unwrap();
            assert_eq!(task.attempts, expected_attempts);
            assert_eq!(task.available_after, 10_000 + 1_000 * expected_attempts);
        }
        // Still present after repeated failures.
        assert_eq!(db.list_tasks().unwrap().len(), 1);
    }

    #[test]
    fn test_retry_state_roundtrip() {
        let db = open_db();
        assert!(db.get_retry_state("events").unwrap().is_none());

        db.set_retry_state("events", 12_345).unwrap();
        assert_eq!(db.get_retry_state("events").unwrap(), Some(12_345));

        // Overwritten, not accumulated.
        db.set_retry_state("events", 99_999).unwrap();
        assert_eq!(db.get_retry_state("events").unwrap(), Some(99_999));

        db.clear_retry_state("events").unwrap();
        assert!(db.get_retry_state("events").unwrap().is_none());
    }

    #[test]
    fn test_replace_matches_is_wholesale_per_partition() {
        let db = open_db();
        db.replace_matches(
            1,
            "2024-2025",
            TaskType::Upcoming,
            &[sample_match("e1", 1, "2024-2025"), sample_match("e2", 1, "2024-2025")],
        )
        .unwrap();
        db.replace_matches(
            1,
            "2024-2025",
            TaskType::Past,
            &[sample_match("e3", 1, "2024-2025")],
        )
        .unwrap();

        // Replacing the upcoming partition leaves the past partition alone.
        db.replace_matches(
            1,
            "2024-2025",
            TaskType::Upcoming,
            &[sample_match("e4", 1, "2024-2025")],
        )
        .unwrap();

        let upcoming = db.list_matches(1, "2024-2025", TaskType::Upcoming).unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].event_id, "e4");
        assert_eq!(
            db.list_matches(1, "2024-2025", TaskType::Past).unwrap().len(),
            1
        );
        assert!(db.has_matches(1, "2024-2025", TaskType::Upcoming).unwrap());
        assert!(!db.has_matches(2, "2024-2025", TaskType::Upcoming).unwrap());
    }

    #[test]
    fn test_replace_live_matches_is_wholesale_per_sport() {
        let db = open_db();
        let game = |id: &str| LiveMatch {
            event_id: id.to_string(),
            sport: "soccer".into(),
            league: "English Premier League".into(),
            home_team: "Arsenal".into(),
            away_team: "Chelsea".into(),
            home_score: 1,
            away_score: 0,
            minute: Some(55),
            status: MatchStatus::InProgress,
        };
        db.replace_live_matches("soccer", &[game("a"), game("b")])
            .unwrap();
        db.replace_live_matches("soccer", &[game("c")]).unwrap();

        let games = db.list_live_matches("soccer").unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].event_id, "c");
        assert_eq!(games[0].minute, Some(55));
        assert_eq!(games[0].status, MatchStatus::InProgress);
    }

    #[test]
    fn test_replace_seasons() {
        let db = open_db();
        db.replace_seasons(
            1,
            &[
                Season { name: "2023-2024".into() },
                Season { name: "2024-2025".into() },
            ],
        )
        .unwrap();
        db.replace_seasons(1, &[Season { name: "2024-2025".into() }])
            .unwrap();
        let seasons = db.list_seasons(1).unwrap();
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].name, "2024-2025");
    }
}
