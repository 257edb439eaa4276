//! OAuth state management for CSRF protection.
//!
//! A state token binds the consent redirect to the (user, org) that started
//! it. The encoded token travels through the provider and comes back on the
//! callback; the copy kept in the cache is the reference it must match.

use crate::cache::KeyValueCache;
use crate::error::{IntegrationError, IntegrationResult};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Bytes of entropy in a state nonce
const NONCE_BYTES: usize = 32;

/// URL-safe alphabet; pads on encode, accepts padded or unpadded input.
const STATE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Cache key of the pending state for an (org, user) pair.
pub fn state_key(org_id: &str, user_id: &str) -> String {
    format!("state:{}:{}", org_id, user_id)
}

/// State parameter carried through the consent redirect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateToken {
    #[serde(rename = "state")]
    pub nonce: String,
    pub user_id: String,
    pub org_id: String,
}

impl StateToken {
    /// New token with a fresh random nonce.
    pub fn generate(user_id: &str, org_id: &str) -> Self {
        let mut bytes = [0u8; NONCE_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);

        Self {
            nonce: URL_SAFE_NO_PAD.encode(bytes),
            user_id: user_id.to_string(),
            org_id: org_id.to_string(),
        }
    }

    /// JSON form, as kept in the cache.
    pub fn to_json(&self) -> IntegrationResult<String> {
        serde_json::to_string(self)
            .map_err(|e| IntegrationError::Decoding(format!("Unserializable state: {}", e)))
    }

    /// Base64url(JSON) form, as sent in the `state` query parameter.
    pub fn encode(&self) -> IntegrationResult<String> {
        Ok(STATE_ENGINE.encode(self.to_json()?))
    }

    /// Parse the `state` query parameter returned on the callback.
    pub fn decode(encoded: &str) -> IntegrationResult<Self> {
        let bytes = STATE_ENGINE
            .decode(encoded)
            .map_err(|e| IntegrationError::Decoding(format!("Invalid state encoding: {}", e)))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| IntegrationError::Decoding(format!("Invalid state payload: {}", e)))
    }
}

/// Pending-state bookkeeping on top of the shared cache.
#[derive(Clone)]
pub struct StateManager {
    cache: Arc<dyn KeyValueCache>,
    ttl_seconds: u64,
}

impl StateManager {
    /// Create a new state manager
    ///
    /// # Arguments
    /// * `cache` - Shared cache holding pending states
    /// * `ttl_seconds` - How long states remain valid (default: 600 = 10 minutes)
    pub fn new(cache: Arc<dyn KeyValueCache>, ttl_seconds: u64) -> Self {
        Self { cache, ttl_seconds }
    }

    /// Generate a new state token and store it, replacing any pending state
    /// for the same (org, user).
    pub async fn create_state(&self, user_id: &str, org_id: &str) -> IntegrationResult<StateToken> {
        let token = StateToken::generate(user_id, org_id);
        self.cache
            .set(&state_key(org_id, user_id), token.to_json()?, self.ttl_seconds)
            .await?;
        Ok(token)
    }

    /// Check a returned token against the pending one.
    ///
    /// Fails with `StateMismatch` when nothing is pending for the token's
    /// (org, user), or when the nonces differ. Does not consume the state.
    pub async fn validate(&self, returned: &StateToken) -> IntegrationResult<()> {
        let saved = self
            .cache
            .get(&state_key(&returned.org_id, &returned.user_id))
            .await?
            .ok_or(IntegrationError::StateMismatch)?;

        let saved: StateToken =
            serde_json::from_str(&saved).map_err(|_| IntegrationError::StateMismatch)?;

        if saved.nonce != returned.nonce {
            return Err(IntegrationError::StateMismatch);
        }

        Ok(())
    }

    /// Remove the pending state (single-use).
    pub async fn consume(&self, token: &StateToken) -> anyhow::Result<()> {
        self.cache
            .delete(&state_key(&token.org_id, &token.user_id))
            .await
    }
}
