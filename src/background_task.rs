use tokio::time::{interval, Duration};

use crate::limiter::memory_store::InMemoryRateLimitStore;

/// Periodically reclaims expired counters from the in-process store.
pub async fn start_eviction_task(store: InMemoryRateLimitStore, every: Duration) {
    let mut interval = interval(every);

    loop {
        interval.tick().await;

        let removed = store.evict_expired();
        if removed > 0 {
            tracing::debug!(removed, tracked = store.len(), "Evicted expired rate limit counters");
        }
    }
}
