use std::{future::Future, sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::{
    entities::client::ClientIdentity,
    errors::StoreError,
    repositories::rate_limit::RateLimitStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
}

/// Fixed-window request counter per client.
///
/// Every admitted request rewrites the counter with a fresh full-window
/// expiry, so a client sending steadily just under the limit keeps its window
/// open, and a burst straddling two windows can see up to twice the limit.
/// The read and the write are separate store calls: concurrent requests from
/// one client may both be admitted past the limit.
///
/// When the store is unreachable or slow the limiter fails open.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    max_requests: u32,
    window_secs: u64,
    store_timeout: Duration,
}

impl RateLimiter {
    pub fn new(
        store: Arc<dyn RateLimitStore>,
        max_requests: u32,
        window_secs: u64,
        store_timeout: Duration,
    ) -> Self {
        RateLimiter {
            store,
            max_requests,
            window_secs,
            store_timeout,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }

    pub async fn check(&self, identity: &ClientIdentity) -> RateLimitDecision {
        let key = identity.rate_limit_key();

        let count = match self.bounded(self.store.get(&key)).await {
            Ok(value) => parse_count(value.as_deref()),
            Err(e) => {
                warn!(client = %identity, error = %e, "Rate limit store unavailable, failing open");
                return self.fail_open();
            }
        };

        if count >= self.max_requests {
            debug!(client = %identity, count, "Rate limit exceeded");
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
            };
        }

        let next = count + 1;
        let written = self
            .bounded(self.store.put(&key, &next.to_string(), self.window_secs))
            .await;

        if let Err(e) = written {
            warn!(client = %identity, error = %e, "Failed to record request in rate limit store");
        }

        RateLimitDecision {
            allowed: true,
            remaining: self.max_requests - next,
        }
    }

    fn fail_open(&self) -> RateLimitDecision {
        RateLimitDecision {
            allowed: true,
            remaining: self.max_requests.saturating_sub(1),
        }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.store_timeout))?
    }
}

/// Missing or unreadable counters count as zero.
fn parse_count(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(0)
}
