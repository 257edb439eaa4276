//! Connector Manager HTTP API — item loading endpoints.
//!
//! Exposes two routes:
//! - `POST /integrations/hubspot/get_hubspot_items` — load normalized CRM items
//! - `GET /health` — liveness probe

use crate::Connector;
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Form, Router,
};
use crm_bridge::credentials::CredentialBlob;
use crm_bridge::{IntegrationError, IntegrationItem, IntegrationResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for the connector API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub connector: Arc<dyn Connector>,
}

/// Form body for item loading: the credential blob as a JSON string.
#[derive(Deserialize)]
pub struct LoadItemsForm {
    pub credentials: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

// ---------------------------------------------------------------------------
// Business logic (called from HTTP handlers and unit tests)
// ---------------------------------------------------------------------------

/// Parses posted credentials and loads every item the connector can see.
pub async fn handle_load_items(
    state: &ApiState,
    raw_credentials: &str,
) -> IntegrationResult<Vec<IntegrationItem>> {
    let credentials = CredentialBlob::from_json_str(raw_credentials)?;
    state.connector.fetch(&credentials).await
}

// ---------------------------------------------------------------------------
// HTTP handlers
// ---------------------------------------------------------------------------

async fn load_items(
    State(state): State<Arc<ApiState>>,
    Form(form): Form<LoadItemsForm>,
) -> Result<Json<Vec<IntegrationItem>>, IntegrationError> {
    let items = handle_load_items(&state, &form.credentials).await?;
    Ok(Json(items))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Builds the connector API router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/integrations/hubspot/get_hubspot_items", post(load_items))
        .route("/health", get(health))
        .with_state(Arc::new(state))
}
