use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

/// Enforces a minimum interval between request starts per logical endpoint
/// key. Keys without a configured interval bypass limiting entirely.
///
/// Admission is serialized per key: the per-key lock is held while the
/// remaining wait is computed and slept out, and released before the
/// operation body runs, so a slow response never blocks the next admission
/// window. State is in-memory only; a restart resets the limiter, which is
/// fine because it only smooths bursts.
pub struct RateLimiter {
    intervals: HashMap<String, Duration>,
    last_start: Mutex<HashMap<String, Arc<tokio::sync::Mutex<Option<Instant>>>>>,
}

impl RateLimiter {
    pub fn new(intervals: HashMap<String, Duration>) -> Self {
        RateLimiter {
            intervals,
            last_start: Mutex::new(HashMap::new()),
        }
    }

    /// Run `op` once the key's minimum interval since the previous start has
    /// elapsed. Unknown keys run immediately.
    pub async fn run<F, Fut, T>(&self, key: &str, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let Some(&interval) = self.intervals.get(key) else {
            return op().await;
        };

        // The outer map lock covers only the slot lookup, never a wait.
        let slot = {
            let mut map = self.last_start.lock().unwrap();
            Arc::clone(map.entry(key.to_string()).or_default())
        };

        let mut last = slot.lock().await;
        if let Some(prev) = *last {
            let elapsed = Instant::now().duration_since(prev);
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
        drop(last);

        op().await
    }
}
