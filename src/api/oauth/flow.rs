//! The HubSpot authorization-code flow: initiation, callback, and one-shot
//! credential pickup.

use super::exchange::exchange_code_for_token;
use super::provider::OAuthProviderConfig;
use super::state_manager::{StateManager, StateToken};
use crate::cache::KeyValueCache;
use crate::config::BridgeConfig;
use crate::credentials::{CredentialBlob, CredentialStore};
use crate::error::{IntegrationError, IntegrationResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Page returned to the consent popup. Closing the window tells the opener
/// the flow is done and credentials can be picked up.
pub const CLOSE_WINDOW_HTML: &str = r#"<html>
    <script>
        window.close();
    </script>
</html>
"#;

/// OAuth callback query parameters
#[derive(Debug, Default, Deserialize)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// OAuth flow over the shared cache.
pub struct OAuthFlow {
    provider: OAuthProviderConfig,
    states: StateManager,
    credentials: CredentialStore,
    http_client: reqwest::Client,
}

impl OAuthFlow {
    pub fn new(
        provider: OAuthProviderConfig,
        cache: Arc<dyn KeyValueCache>,
        state_ttl_seconds: u64,
        credentials_ttl_seconds: u64,
    ) -> Self {
        Self {
            provider,
            states: StateManager::new(cache.clone(), state_ttl_seconds),
            credentials: CredentialStore::new(cache, credentials_ttl_seconds),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &BridgeConfig, cache: Arc<dyn KeyValueCache>) -> Self {
        Self::new(
            OAuthProviderConfig::from_hubspot(&config.hubspot),
            cache,
            config.oauth.state_ttl_seconds,
            config.oauth.credentials_ttl_seconds,
        )
    }

    /// Start the flow for (user, org): store a fresh state and return the
    /// provider's consent URL carrying it.
    pub async fn authorize(&self, user_id: &str, org_id: &str) -> IntegrationResult<String> {
        let state = self.states.create_state(user_id, org_id).await?;
        let auth_url = self.provider.build_auth_url(&state.encode()?);

        info!(user_id = %user_id, org_id = %org_id, "HubSpot authorization started");
        Ok(auth_url)
    }

    /// Handle the provider's redirect back to us.
    ///
    /// The state is checked before anything is sent to the token endpoint.
    /// Once it passes, the state is consumed whether or not the exchange
    /// succeeds. Returns the HTML page that closes the popup.
    pub async fn handle_callback(&self, callback: OAuthCallback) -> IntegrationResult<String> {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());

        if let Some(error) = present(callback.error) {
            let description = present(callback.error_description).unwrap_or(error);
            warn!(description = %description, "OAuth authorization failed");
            return Err(IntegrationError::Client(description));
        }

        let (code, encoded_state) = match (present(callback.code), present(callback.state)) {
            (Some(code), Some(state)) => (code, state),
            _ => {
                return Err(IntegrationError::Client(
                    "Missing code or state parameter".to_string(),
                ))
            }
        };

        let state = StateToken::decode(&encoded_state)?;

        if let Err(e) = self.states.validate(&state).await {
            warn!(
                user_id = %state.user_id,
                org_id = %state.org_id,
                "OAuth state rejected (possible CSRF attack)"
            );
            return Err(e);
        }

        debug!(user_id = %state.user_id, org_id = %state.org_id, "CSRF state validated");

        let (exchange, consumed) = tokio::join!(
            exchange_code_for_token(
                &self.http_client,
                &self.provider.token_url,
                &code,
                &self.provider.redirect_uri,
                &self.provider.client_id,
                &self.provider.client_secret,
            ),
            self.states.consume(&state),
        );

        if let Err(e) = consumed {
            warn!(error = %e, "Failed to delete OAuth state");
        }

        let credentials = exchange?;

        self.credentials
            .store(&state.user_id, &state.org_id, &credentials)
            .await?;

        info!(
            user_id = %state.user_id,
            org_id = %state.org_id,
            has_refresh_token = credentials.refresh_token.is_some(),
            "OAuth flow completed successfully"
        );

        Ok(CLOSE_WINDOW_HTML.to_string())
    }

    /// Hand out the credentials stored by the callback, once.
    pub async fn get_credentials(
        &self,
        user_id: &str,
        org_id: &str,
    ) -> IntegrationResult<CredentialBlob> {
        let credentials = self.credentials.take(user_id, org_id).await?;
        debug!(user_id = %user_id, org_id = %org_id, "Credentials picked up");
        Ok(credentials)
    }
}
