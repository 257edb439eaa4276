//! OAuth 2.0 authorization flow for the HubSpot integration.
//!
//! Implements the authorization code flow:
//! 1. Frontend POSTs /integrations/hubspot/authorize → consent URL (opened in a popup)
//! 2. User authorizes on HubSpot
//! 3. HubSpot redirects the popup to /integrations/hubspot/oauth2callback
//! 4. State is checked, code exchanged for a token, token parked in the cache
//! 5. Popup closes itself; frontend POSTs /integrations/hubspot/credentials once

mod exchange;
mod flow;
mod provider;
mod state_manager;

pub use exchange::exchange_code_for_token;
pub use flow::{OAuthCallback, OAuthFlow, CLOSE_WINDOW_HTML};
pub use provider::OAuthProviderConfig;
pub use state_manager::{state_key, StateManager, StateToken};

use crate::credentials::CredentialBlob;
use crate::error::IntegrationError;
use axum::{
    extract::{Query, State},
    response::{Html, Json},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Shared application state for OAuth API
#[derive(Clone)]
pub struct OAuthAppState {
    pub flow: Arc<OAuthFlow>,
}

/// Form body identifying who is connecting
#[derive(Deserialize)]
pub struct UserOrgForm {
    pub user_id: String,
    pub org_id: String,
}

/// Create OAuth API router
pub fn create_oauth_router(state: OAuthAppState) -> Router {
    Router::new()
        .route("/integrations/hubspot/authorize", post(authorize))
        .route("/integrations/hubspot/oauth2callback", get(oauth_callback))
        .route("/integrations/hubspot/credentials", post(credentials))
        .with_state(Arc::new(state))
}

/// POST /integrations/hubspot/authorize
///
/// Returns the consent URL as a JSON string.
async fn authorize(
    State(state): State<Arc<OAuthAppState>>,
    Form(form): Form<UserOrgForm>,
) -> Result<Json<String>, IntegrationError> {
    debug!(user_id = %form.user_id, org_id = %form.org_id, "OAuth start requested");
    let url = state.flow.authorize(&form.user_id, &form.org_id).await?;
    Ok(Json(url))
}

/// GET /integrations/hubspot/oauth2callback
///
/// # Security
/// - Validates the CSRF state against the pending one before the exchange
/// - Single-use state (consumed once validated)
async fn oauth_callback(
    State(state): State<Arc<OAuthAppState>>,
    Query(callback): Query<OAuthCallback>,
) -> Result<Html<String>, IntegrationError> {
    debug!("OAuth callback received");
    let page = state.flow.handle_callback(callback).await?;
    Ok(Html(page))
}

/// POST /integrations/hubspot/credentials
async fn credentials(
    State(state): State<Arc<OAuthAppState>>,
    Form(form): Form<UserOrgForm>,
) -> Result<Json<CredentialBlob>, IntegrationError> {
    let credentials = state
        .flow
        .get_credentials(&form.user_id, &form.org_id)
        .await?;
    Ok(Json(credentials))
}
