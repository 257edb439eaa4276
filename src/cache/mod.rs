//! Shared key-value cache with per-key expiration.
//!
//! The OAuth flow keeps its short-lived entries (CSRF state, freshly issued
//! credentials) here. Components receive the cache as an
//! `Arc<dyn KeyValueCache>` so tests can substitute their own backend.

mod memory;
mod redis_cache;

pub use self::memory::MemoryCache;
pub use self::redis_cache::RedisCache;

use anyhow::Result;
use async_trait::async_trait;

/// Minimal cache contract: set with TTL, get, delete.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Store `value` under `key`, replacing any previous value. The entry
    /// disappears after `ttl_seconds`.
    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> Result<()>;

    /// Read a live entry.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Remove an entry. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Background task to periodically sweep expired entries from a
/// [`MemoryCache`].
pub async fn run_cache_cleanup(cache: MemoryCache, interval_seconds: u64) {
    let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(interval_seconds));

    loop {
        interval.tick().await;
        let removed = cache.cleanup_expired();
        tracing::debug!(
            removed,
            remaining = cache.count(),
            "Cache cleanup complete"
        );
    }
}
