//! Credential blobs issued by the provider's token endpoint.
//!
//! A blob is written once by the OAuth callback and read back exactly once
//! by the frontend that opened the consent popup (see [`CredentialStore`]).
//!
//! ```no_run
//! use crm_bridge::cache::MemoryCache;
//! use crm_bridge::credentials::{CredentialBlob, CredentialStore};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), crm_bridge::IntegrationError> {
//! let store = CredentialStore::new(Arc::new(MemoryCache::new()), 600);
//!
//! let blob = CredentialBlob::from_json_str(r#"{"access_token": "pat-123"}"#)?;
//! store.store("user1", "org1", &blob).await?;
//!
//! // First read consumes the entry
//! let creds = store.take("user1", "org1").await?;
//! assert_eq!(creds.access_token(), Some("pat-123"));
//! assert!(store.take("user1", "org1").await.is_err());
//! # Ok(())
//! # }
//! ```

mod storage;

pub use storage::{credentials_key, CredentialStore};

use crate::error::{IntegrationError, IntegrationResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Token endpoint response, kept whole.
///
/// The well-known OAuth fields are typed; anything else the provider sends
/// (`hub_id`, `scopes`, ...) is preserved in `extra` so the blob serializes
/// back to the same document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CredentialBlob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Lifetime of the access token in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CredentialBlob {
    /// Parse a serialized blob (as stored, or as posted back by a client).
    pub fn from_json_str(raw: &str) -> IntegrationResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| IntegrationError::Decoding(format!("Invalid credentials: {}", e)))
    }

    pub fn to_json_string(&self) -> IntegrationResult<String> {
        serde_json::to_string(self)
            .map_err(|e| IntegrationError::Decoding(format!("Unserializable credentials: {}", e)))
    }

    /// The bearer token, if present and non-empty.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_preserves_unknown_fields() {
        let raw = r#"{
            "access_token": "CKTx1",
            "refresh_token": "na1-abc",
            "expires_in": 1800,
            "token_type": "bearer",
            "hub_id": 4242
        }"#;

        let blob = CredentialBlob::from_json_str(raw).unwrap();
        assert_eq!(blob.access_token(), Some("CKTx1"));
        assert_eq!(blob.expires_in, Some(1800));
        assert_eq!(blob.extra["hub_id"], 4242);

        let reparsed: Value = serde_json::from_str(&blob.to_json_string().unwrap()).unwrap();
        assert_eq!(reparsed, serde_json::from_str::<Value>(raw).unwrap());
    }

    #[test]
    fn test_blob_without_access_token() {
        let blob = CredentialBlob::from_json_str(r#"{"token_type": "bearer"}"#).unwrap();
        assert_eq!(blob.access_token(), None);

        let blob = CredentialBlob::from_json_str(r#"{"access_token": ""}"#).unwrap();
        assert_eq!(blob.access_token(), None);
    }

    #[test]
    fn test_malformed_blob_is_decoding_error() {
        let err = CredentialBlob::from_json_str("not json").unwrap_err();
        assert!(matches!(err, IntegrationError::Decoding(_)));
    }
}
