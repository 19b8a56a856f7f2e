use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use reqwest::{Client, Response, StatusCode};
use tracing::debug;

use super::logos::{LogoFetcher, LogoPayload};
use crate::db::models::{LiveMatch, Match, MatchStatus, Season};
use crate::error::ApiError;

/// Logical endpoint keys, shared by the rate limiter and the persisted
/// retry state so both layers see the same request classes.
pub mod endpoints {
    pub const SEASONS: &str = "seasons";
    pub const EVENTS: &str = "events";
    pub const LIVESCORE: &str = "livescore";
}

/// Client for a TheSportsDB-style sports-data API.
/// Docs: <https://www.thesportsdb.com/api.php>
pub struct SportsDbClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SportsDbClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(ApiError::Transport)?;
        Ok(SportsDbClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// All seasons the API knows for a league.
    pub async fn get_seasons(&self, league_id: i64) -> Result<Vec<Season>, ApiError> {
        let url = format!(
            "{}/{}/search_all_seasons.php?id={}",
            self.base_url, self.api_key, league_id
        );
        let raw = self.get_json(&url).await?;
        Ok(parse_seasons(&raw))
    }

    /// Every fixture of a league's season, scheduled and completed.
    pub async fn get_season_events(
        &self,
        league_id: i64,
        season: &str,
    ) -> Result<Vec<Match>, ApiError> {
        let url = format!(
            "{}/{}/eventsseason.php?id={}&s={}",
            self.base_url, self.api_key, league_id, season
        );
        let raw = self.get_json(&url).await?;
        Ok(parse_season_events(&raw, league_id, season))
    }

    /// Current live snapshot for a sport.
    pub async fn get_livescores(&self, sport: &str) -> Result<Vec<LiveMatch>, ApiError> {
        let url = format!(
            "{}/{}/livescore.php?s={}",
            self.base_url, self.api_key, sport
        );
        let raw = self.get_json(&url).await?;
        Ok(parse_livescores(&raw))
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, ApiError> {
        debug!(%url, "GET");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(classify_transport)?;
        let resp = check_status(resp)?;
        resp.json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LogoFetcher for SportsDbClient {
    async fn fetch_logo(&self, team_id: i64) -> Result<LogoPayload, ApiError> {
        let url = format!(
            "{}/{}/teambadge.php?id={}",
            self.base_url, self.api_key, team_id
        );
        debug!(%url, "GET badge");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(classify_transport)?;
        let resp = check_status(resp)?;
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await.map_err(classify_transport)?.to_vec();
        Ok(LogoPayload { content_type, body })
    }
}

// ── Response classification ────────────────────────────────────────────────────

fn classify_transport(err: reqwest::Error) -> ApiError {
    if err.is_timeout() || err.is_connect() {
        ApiError::Timeout
    } else {
        ApiError::Transport(err)
    }
}

fn check_status(resp: Response) -> Result<Response, ApiError> {
    match resp.status() {
        status if status.is_success() => Ok(resp),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound),
        StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimited {
            retry_after: parse_retry_after(&resp),
        }),
        status => Err(ApiError::Status(status)),
    }
}

fn parse_retry_after(resp: &Response) -> Option<Duration> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

// ── Parsing helpers ────────────────────────────────────────────────────────────

fn parse_seasons(raw: &serde_json::Value) -> Vec<Season> {
    let seasons = match raw["seasons"].as_array() {
        Some(a) => a,
        None => return vec![],
    };
    seasons
        .iter()
        .filter_map(|s| {
            s["strSeason"].as_str().map(|name| Season {
                name: name.to_string(),
            })
        })
        .collect()
}

fn parse_season_events(raw: &serde_json::Value, league_id: i64, season: &str) -> Vec<Match> {
    let events = match raw["events"].as_array() {
        Some(a) => a,
        None => return vec![],
    };

    events
        .iter()
        .filter_map(|ev| {
            let event_id = ev["idEvent"].as_str()?.to_string();
            let home_team = ev["strHomeTeam"].as_str()?.to_string();
            let away_team = ev["strAwayTeam"].as_str()?.to_string();

            let home_score = int_field(&ev["intHomeScore"]);
            let away_score = int_field(&ev["intAwayScore"]);
            let kickoff_at = parse_kickoff(ev);

            // Season fixtures often carry no status at all; fall back on
            // whether a score has been recorded.
            let status = match ev["strStatus"].as_str() {
                Some(s) if !s.is_empty() => MatchStatus::from_api(s),
                _ if home_score.is_some() && away_score.is_some() => MatchStatus::Finished,
                _ => MatchStatus::NotStarted,
            };

            Some(Match {
                event_id,
                league_id,
                season: season.to_string(),
                home_team,
                away_team,
                home_team_id: id_field(&ev["idHomeTeam"]),
                away_team_id: id_field(&ev["idAwayTeam"]),
                home_score,
                away_score,
                kickoff_at,
                status,
            })
        })
        .collect()
}

fn parse_livescores(raw: &serde_json::Value) -> Vec<LiveMatch> {
    let events = match raw["events"].as_array() {
        Some(a) => a,
        None => return vec![],
    };

    events
        .iter()
        .filter_map(|ev| {
            let event_id = ev["idEvent"].as_str()?.to_string();
            let sport = ev["strSport"].as_str().unwrap_or("soccer").to_lowercase();
            let league = ev["strLeague"].as_str().unwrap_or("unknown").to_string();
            let home_team = ev["strHomeTeam"].as_str()?.to_string();
            let away_team = ev["strAwayTeam"].as_str()?.to_string();

            let minute: Option<i32> = ev["intProgress"]
                .as_str()
                .and_then(|s| s.parse().ok())
                .or_else(|| ev["strProgress"].as_str().and_then(|s| s.parse().ok()));

            let status_str = ev["strStatus"].as_str().unwrap_or("In Progress");

            Some(LiveMatch {
                event_id,
                sport,
                league,
                home_team,
                away_team,
                home_score: int_field(&ev["intHomeScore"]).unwrap_or(0),
                away_score: int_field(&ev["intAwayScore"]).unwrap_or(0),
                minute,
                status: MatchStatus::from_api(status_str),
            })
        })
        .collect()
}

/// Scores arrive as either JSON numbers or numeric strings.
fn int_field(v: &serde_json::Value) -> Option<i32> {
    v.as_str()
        .and_then(|s| s.parse().ok())
        .or_else(|| v.as_i64().map(|n| n as i32))
}

fn id_field(v: &serde_json::Value) -> Option<i64> {
    v.as_str()
        .and_then(|s| s.parse().ok())
        .or_else(|| v.as_i64())
}

fn parse_kickoff(ev: &serde_json::Value) -> Option<DateTime<Utc>> {
    let ts = ev["strTimestamp"].as_str()?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
