//! Optional background sweep of expired metrics.
//!
//! Scrapes already delete expired metrics they walk past. The sweep bounds
//! memory when nobody scrapes for a long time. It never hides anything from
//! readers: until a sweep or scrape deletes them, expired metrics are still
//! returned by `names`/`lines`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use gauge_core::storage::MetricsStorage;

pub async fn run(storage: Arc<MetricsStorage>, every: Duration, mut shutdown: watch::Receiver<bool>) {
    tracing::info!(interval_ms = every.as_millis() as u64, "expiry sweep started");

    let mut tick = tokio::time::interval(every);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately
    tick.tick().await;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let removed = storage.sweep_expired();
                if !removed.is_empty() {
                    tracing::warn!(count = removed.len(), metrics = ?removed, "expired metrics swept");
                }
            }
            _ = shutdown.changed() => {
                tracing::info!("expiry sweep shutting down");
                break;
            }
        }
    }
}
