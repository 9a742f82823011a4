use async_trait::async_trait;

use crate::errors::StoreError;

/// Shared key-value store holding the per-client request counters.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Current value under `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrites `key` with `value`, expiring `expires_in_secs` from now.
    async fn put(&self, key: &str, value: &str, expires_in_secs: u64) -> Result<(), StoreError>;
}
