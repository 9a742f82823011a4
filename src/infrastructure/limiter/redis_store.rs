use async_trait::async_trait;
use deadpool_redis::{Config as RedisPoolConfig, Pool, Runtime};
use redis::AsyncCommands;

use crate::{errors::StoreError, repositories::rate_limit::RateLimitStore};

/// Counter store shared by every instance behind the same Redis.
#[derive(Clone)]
pub struct RedisRateLimitStore {
    pool: Pool,
}

impl RedisRateLimitStore {
    pub fn new(pool: Pool) -> Self {
        RedisRateLimitStore { pool }
    }

    /// Creating the pool does not connect; the first command does.
    pub fn from_url(url: &str) -> Result<Self, StoreError> {
        let pool = RedisPoolConfig::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self::new(pool))
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        let _: String = conn.ping().await?;
        Ok(())
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.pool.get().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str, expires_in_secs: u64) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        let _: () = conn.set_ex(key, value, expires_in_secs).await?;
        Ok(())
    }
}
