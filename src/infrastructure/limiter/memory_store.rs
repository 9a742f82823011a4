use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::{Duration, Instant};

use crate::{errors::StoreError, repositories::rate_limit::RateLimitStore};

#[derive(Debug, Clone)]
struct CounterEntry {
    value: String,
    expires_at: Instant,
}

/// Process-local counter store with per-key expiry.
///
/// Used when no Redis URL is configured and in tests. Expired entries are
/// invisible to `get` immediately; `evict_expired` reclaims their memory and is
/// driven by the background eviction task.
#[derive(Clone, Default)]
pub struct InMemoryRateLimitStore {
    map: Arc<DashMap<String, CounterEntry>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drops every expired counter and returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.map.retain(|_, entry| {
            let live = entry.expires_at > now;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();

        let expired = match self.map.get(key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.map.remove_if(key, |_, entry| entry.expires_at <= now);
        }

        Ok(None)
    }

    async fn put(&self, key: &str, value: &str, expires_in_secs: u64) -> Result<(), StoreError> {
        let entry = CounterEntry {
            value: value.to_string(),
            expires_at: Instant::now() + Duration::from_secs(expires_in_secs),
        };
        self.map.insert(key.to_string(), entry);
        Ok(())
    }
}
