use super::KeyValueCache;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-process cache backend.
///
/// Expired entries are never returned; they are dropped lazily on read and
/// in bulk by [`MemoryCache::cleanup_expired`].
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> Result<()> {
        let expires_at = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .with_context(|| format!("TTL of {} seconds is out of range", ttl_seconds))?;

        self.entries
            .insert(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let expired = match self.entries.get(key) {
            Some(entry) if Utc::now() < entry.expires_at => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };

        // read guard is dropped before removing
        if expired {
            self.entries
                .remove_if(key, |_, entry| Utc::now() >= entry.expires_at);
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::new();

        cache.set("state:org:user", "value".to_string(), 600).await.unwrap();
        assert_eq!(
            cache.get("state:org:user").await.unwrap().as_deref(),
            Some("value")
        );

        cache.delete("state:org:user").await.unwrap();
        assert!(cache.get("state:org:user").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_replaces_value() {
        let cache = MemoryCache::new();

        cache.set("k", "first".to_string(), 600).await.unwrap();
        cache.set("k", "second".to_string(), 600).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("second"));
        assert_eq!(cache.count(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let cache = MemoryCache::new();
        assert!(cache.delete("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_entry_not_returned() {
        let cache = MemoryCache::new();

        cache.set("k", "v".to_string(), 0).await.unwrap();

        assert!(cache.get("k").await.unwrap().is_none());
        assert_eq!(cache.count(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_removes_expired() {
        let cache = MemoryCache::new();

        cache.set("short1", "v".to_string(), 0).await.unwrap();
        cache.set("short2", "v".to_string(), 0).await.unwrap();
        cache.set("long", "v".to_string(), 600).await.unwrap();
        assert_eq!(cache.count(), 3);

        assert_eq!(cache.cleanup_expired(), 2);
        assert_eq!(cache.count(), 1);
        assert!(cache.get("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_is_rejected() {
        let cache = MemoryCache::new();

        assert!(cache.set("k", "v".to_string(), u64::MAX).await.is_err());
        assert_eq!(cache.count(), 0);
    }
}
