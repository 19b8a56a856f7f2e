use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which partition of a season a prefetch task warms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    Upcoming,
    Past,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Upcoming => "upcoming",
            TaskType::Past => "past",
        }
    }

    pub fn parse(s: &str) -> Option<TaskType> {
        match s {
            "upcoming" => Some(TaskType::Upcoming),
            "past" => Some(TaskType::Past),
            _ => None,
        }
    }
}

/// A queued warm-up fetch.
///
/// At most one row exists per (league_id, season, task_type); enqueuing a
/// duplicate promotes the existing row instead of inserting a second one.
#[derive(Debug, Clone)]
pub struct PrefetchTask {
    pub id: i64,
    pub league_id: i64,
    pub season: String,
    pub task_type: TaskType,
    pub force_refresh: bool,
    pub priority: i64,
    /// Earliest dispatch time, epoch milliseconds.
    pub available_after: i64,
    pub attempts: i64,
    pub created_at: DateTime<Utc>,
}

/// A season as listed by the upstream API, e.g. "2024-2025".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    NotStarted,
    InProgress,
    HalfTime,
    Finished,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::NotStarted => "not_started",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::HalfTime => "half_time",
            MatchStatus::Finished => "finished",
        }
    }

    pub fn parse(s: &str) -> Option<MatchStatus> {
        match s {
            "not_started" => Some(MatchStatus::NotStarted),
            "in_progress" => Some(MatchStatus::InProgress),
            "half_time" => Some(MatchStatus::HalfTime),
            "finished" => Some(MatchStatus::Finished),
            _ => None,
        }
    }

    /// Map the upstream API's free-form status strings.
    pub fn from_api(s: &str) -> MatchStatus {
        match s.to_lowercase().as_str() {
            "not started" | "ns" => MatchStatus::NotStarted,
            "half time" | "ht" | "halftime" => MatchStatus::HalfTime,
            "match finished" | "ft" | "finished" | "aet" | "pen" => MatchStatus::Finished,
            _ => MatchStatus::InProgress,
        }
    }
}

/// A scheduled or completed fixture within a season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    /// External event id from the sports-data provider.
    pub event_id: String,
    pub league_id: i64,
    pub season: String,
    pub home_team: String,
    pub away_team: String,
    pub home_team_id: Option<i64>,
    pub away_team_id: Option<i64>,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub kickoff_at: Option<DateTime<Utc>>,
    pub status: MatchStatus,
}

/// Raw live game state as fetched from the livescore endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveMatch {
    pub event_id: String,
    pub sport: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: i32,
    pub away_score: i32,
    /// Minute/period when the snapshot was taken.
    pub minute: Option<i32>,
    pub status: MatchStatus,
}
