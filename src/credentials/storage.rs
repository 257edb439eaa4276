//! Transient credential storage on top of the shared cache.

use super::CredentialBlob;
use crate::cache::KeyValueCache;
use crate::error::{IntegrationError, IntegrationResult};
use std::sync::Arc;

/// Cache key of the credential blob for an (org, user) pair.
pub fn credentials_key(org_id: &str, user_id: &str) -> String {
    format!("credentials:{}:{}", org_id, user_id)
}

/// Single-use credential storage.
///
/// # Lifecycle
/// - `store` writes the blob with a TTL (default 600 seconds)
/// - `take` returns it once and deletes it, so a replayed read finds nothing
#[derive(Clone)]
pub struct CredentialStore {
    cache: Arc<dyn KeyValueCache>,
    ttl_seconds: u64,
}

impl CredentialStore {
    pub fn new(cache: Arc<dyn KeyValueCache>, ttl_seconds: u64) -> Self {
        Self { cache, ttl_seconds }
    }

    /// Stores credentials for a user and org, replacing any unread blob.
    pub async fn store(
        &self,
        user_id: &str,
        org_id: &str,
        credentials: &CredentialBlob,
    ) -> IntegrationResult<()> {
        let value = credentials.to_json_string()?;
        self.cache
            .set(&credentials_key(org_id, user_id), value, self.ttl_seconds)
            .await?;
        Ok(())
    }

    /// Reads and deletes the credentials for a user and org.
    ///
    /// # Returns
    /// * `Ok(CredentialBlob)` - The stored blob (now removed)
    /// * `Err(Client)` - Nothing stored, already consumed, or expired
    /// * `Err(Decoding)` - The stored value is not valid JSON
    pub async fn take(&self, user_id: &str, org_id: &str) -> IntegrationResult<CredentialBlob> {
        let key = credentials_key(org_id, user_id);

        let raw = self
            .cache
            .get(&key)
            .await?
            .ok_or_else(|| IntegrationError::Client("No credentials found.".to_string()))?;

        self.cache.delete(&key).await?;

        CredentialBlob::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn create_test_store() -> (CredentialStore, MemoryCache) {
        let cache = MemoryCache::new();
        let store = CredentialStore::new(Arc::new(cache.clone()), 600);
        (store, cache)
    }

    fn create_test_credentials() -> CredentialBlob {
        CredentialBlob::from_json_str(
            r#"{"access_token": "CKTx1", "refresh_token": "na1-abc", "expires_in": 1800}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_credentials_key_format() {
        assert_eq!(credentials_key("org9", "user1"), "credentials:org9:user1");
    }

    #[tokio::test]
    async fn test_store_and_take() {
        let (store, cache) = create_test_store();
        let creds = create_test_credentials();

        store.store("user1", "org1", &creds).await.unwrap();
        assert!(cache.get("credentials:org1:user1").await.unwrap().is_some());

        let taken = store.take("user1", "org1").await.unwrap();
        assert_eq!(taken, creds);
    }

    #[tokio::test]
    async fn test_take_is_single_use() {
        let (store, cache) = create_test_store();
        store
            .store("user1", "org1", &create_test_credentials())
            .await
            .unwrap();

        assert!(store.take("user1", "org1").await.is_ok());
        assert_eq!(cache.count(), 0);

        let err = store.take("user1", "org1").await.unwrap_err();
        assert!(matches!(err, IntegrationError::Client(_)));
        assert_eq!(err.to_string(), "No credentials found.");
    }

    #[tokio::test]
    async fn test_take_nonexistent() {
        let (store, _) = create_test_store();
        assert!(store.take("nobody", "org1").await.is_err());
    }

    #[tokio::test]
    async fn test_credentials_isolated_by_org() {
        let (store, _) = create_test_store();
        store
            .store("user1", "org1", &create_test_credentials())
            .await
            .unwrap();

        assert!(store.take("user1", "org2").await.is_err());
        assert!(store.take("user1", "org1").await.is_ok());
    }

    #[tokio::test]
    async fn test_take_malformed_blob() {
        let (store, cache) = create_test_store();
        cache
            .set("credentials:org1:user1", "{broken".to_string(), 600)
            .await
            .unwrap();

        let err = store.take("user1", "org1").await.unwrap_err();
        assert!(matches!(err, IntegrationError::Decoding(_)));
        // consumed even when unreadable
        assert_eq!(cache.count(), 0);
    }
}
