use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::ApiError;

/// Raw logo payload as returned by the upstream API, before normalisation.
#[derive(Debug, Clone)]
pub struct LogoPayload {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Fetches raw logo payloads. Implemented by the API client; stubbed in tests.
#[async_trait]
pub trait LogoFetcher: Send + Sync {
    async fn fetch_logo(&self, team_id: i64) -> Result<LogoPayload, ApiError>;
}

/// Memoised team logo cache with a shared fetch throttle.
///
/// `get_logo` never fails: a failed fetch is cached as an empty string (the
/// miss marker) so a broken badge is not re-fetched on every call. Entries
/// are never evicted; the team universe is small and finite.
///
/// Concurrent first requests for the same team share a single fetch. The
/// throttle schedules fetch *starts* across all teams: each fetch claims the
/// next slot, spaced a fixed interval after the later of "now" and the
/// previous slot. The slot bookkeeping happens under a brief lock; the wait
/// and the network call do not.
pub struct LogoCache {
    fetcher: Arc<dyn LogoFetcher>,
    spacing: Duration,
    entries: Mutex<HashMap<i64, Arc<OnceCell<String>>>>,
    next_slot: Mutex<Option<Instant>>,
}

impl LogoCache {
    pub fn new(fetcher: Arc<dyn LogoFetcher>, spacing: Duration) -> Self {
        LogoCache {
            fetcher,
            spacing,
            entries: Mutex::new(HashMap::new()),
            next_slot: Mutex::new(None),
        }
    }

    /// The team's logo as sanitized base64, or an empty string when no logo
    /// is available.
    pub async fn get_logo(&self, team_id: i64) -> String {
        let cell = {
            let mut entries = self.entries.lock().unwrap();
            Arc::clone(entries.entry(team_id).or_default())
        };
        cell.get_or_init(|| self.fetch_throttled(team_id))
            .await
            .clone()
    }

    async fn fetch_throttled(&self, team_id: i64) -> String {
        let start = {
            let mut slot = self.next_slot.lock().unwrap();
            let now = Instant::now();
            let start = match *slot {
                Some(s) if s > now => s,
                _ => now,
            };
            *slot = Some(start + self.spacing);
            start
        };
        tokio::time::sleep_until(start).await;

        match self.fetcher.fetch_logo(team_id).await {
            Ok(payload) => {
                debug!(team_id, bytes = payload.body.len(), "logo fetched");
                normalize_logo(&payload)
            }
            Err(e) => {
                warn!(team_id, error = %e, "logo fetch failed, caching miss");
                String::new()
            }
        }
    }
}

/// Normalize a heterogeneous logo payload into base64.
///
/// The upstream returns logos in three shapes: raw image bytes, a JSON
/// document with a base64 field, or a bare (possibly data-URL-prefixed)
/// base64 string. Anything that doesn't validate falls back to encoding the
/// raw bytes verbatim.
fn normalize_logo(payload: &LogoPayload) -> String {
    let content_type = payload.content_type.as_deref().unwrap_or("");
    if content_type.starts_with("image/") {
        return BASE64.encode(&payload.body);
    }

    let text = String::from_utf8_lossy(&payload.body);
    let trimmed = text.trim();

    if content_type.contains("json") || trimmed.starts_with('{') {
        if let Some(field) = serde_json::from_str::<serde_json::Value>(trimmed)
            .ok()
            .as_ref()
            .and_then(extract_base64_field)
        {
            return field;
        }
        return BASE64.encode(&payload.body);
    }

    let stripped = strip_base64_prefix(trimmed);
    if looks_like_base64(stripped) {
        return stripped.to_string();
    }
    BASE64.encode(&payload.body)
}

/// First plausible base64 string among the conventional payload fields.
fn extract_base64_field(value: &serde_json::Value) -> Option<String> {
    let obj = value.as_object()?;
    for key in ["image", "logo", "badge", "data"] {
        if let Some(s) = obj.get(key).and_then(|v| v.as_str()) {
            let s = strip_base64_prefix(s.trim());
            if looks_like_base64(s) {
                return Some(s.to_string());
            }
        }
    }
    None
}

/// Drop a data-URL style header ("data:image/png;base64,....") or a bare
/// "base64," prefix, keeping only the encoded payload.
fn strip_base64_prefix(s: &str) -> &str {
    match s.find("base64,") {
        Some(idx) => &s[idx + "base64,".len()..],
        None => s,
    }
}

const MIN_BASE64_LEN: usize = 32;

fn looks_like_base64(s: &str) -> bool {
    s.len() >= MIN_BASE64_LEN
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=' | b'\r' | b'\n'))
}
