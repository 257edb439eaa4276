//! Error model shared by the OAuth flow, the credential store and the
//! connectors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to callers of the integration operations.
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// Missing or invalid request parameters.
    #[error("{0}")]
    Client(String),

    /// CSRF check failed: the returned state does not match the stored one.
    #[error("State does not match.")]
    StateMismatch,

    /// The provider rejected or failed a request (token exchange).
    #[error("{0}")]
    Upstream(String),

    /// A state parameter or stored blob could not be decoded.
    #[error("{0}")]
    Decoding(String),

    /// The shared cache failed.
    #[error("cache error: {0}")]
    Cache(#[from] anyhow::Error),
}

impl IntegrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IntegrationError::Client(_)
            | IntegrationError::StateMismatch
            | IntegrationError::Decoding(_) => StatusCode::BAD_REQUEST,
            IntegrationError::Upstream(_) => StatusCode::BAD_GATEWAY,
            IntegrationError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type IntegrationResult<T> = std::result::Result<T, IntegrationError>;

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for IntegrationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(ErrorResponse {
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            IntegrationError::Client("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            IntegrationError::StateMismatch.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            IntegrationError::Upstream("x".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            IntegrationError::Cache(anyhow::anyhow!("down")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_carries_detail() {
        let response = IntegrationError::Client("No credentials found.".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "No credentials found.");
    }
}
