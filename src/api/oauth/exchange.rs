//! OAuth token exchange logic.
//!
//! Handles exchanging authorization codes for access tokens.

use crate::credentials::CredentialBlob;
use crate::error::{IntegrationError, IntegrationResult};
use serde::Serialize;

/// OAuth token exchange request (form-encoded)
#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

/// Exchange authorization code for access token
///
/// # Arguments
/// * `client` - Shared HTTP client
/// * `token_url` - OAuth token endpoint URL
/// * `code` - Authorization code from callback
/// * `redirect_uri` - Redirect URI used in authorization request
/// * `client_id` - OAuth client ID
/// * `client_secret` - OAuth client secret
///
/// # Returns
/// * `Ok(CredentialBlob)` - The token endpoint's JSON response, whole
/// * `Err(Upstream)` - Request failed, non-success status, or non-JSON body
pub async fn exchange_code_for_token(
    client: &reqwest::Client,
    token_url: &str,
    code: &str,
    redirect_uri: &str,
    client_id: &str,
    client_secret: &str,
) -> IntegrationResult<CredentialBlob> {
    let form = TokenRequest {
        grant_type: "authorization_code",
        code,
        redirect_uri,
        client_id,
        client_secret,
    };

    tracing::debug!("Exchanging authorization code for token at {}", token_url);

    let response = client
        .post(token_url)
        .header("Accept", "application/json")
        .form(&form)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to send token exchange request");
            IntegrationError::Upstream("Failed to exchange code for token".to_string())
        })?;

    // Check response status
    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::warn!(status = %status, body = %body, "Token exchange rejected");
        return Err(IntegrationError::Upstream(
            "Failed to exchange code for token".to_string(),
        ));
    }

    let credentials: CredentialBlob = response.json().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to parse token response");
        IntegrationError::Upstream("Invalid token response".to_string())
    })?;

    tracing::debug!(
        "Token exchange successful, has_refresh_token={}, expires_in={:?}",
        credentials.refresh_token.is_some(),
        credentials.expires_in
    );

    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_exchange_posts_form_and_returns_blob() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/v1/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "code-123".into()),
                Matcher::UrlEncoded("redirect_uri".into(), "http://localhost/cb".into()),
                Matcher::UrlEncoded("client_id".into(), "cid".into()),
                Matcher::UrlEncoded("client_secret".into(), "csecret".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "access_token": "CKTx1",
                    "refresh_token": "na1-abc",
                    "expires_in": 1800,
                    "token_type": "bearer"
                }"#,
            )
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let token_url = format!("{}/oauth/v1/token", server.url());
        let blob = exchange_code_for_token(
            &client,
            &token_url,
            "code-123",
            "http://localhost/cb",
            "cid",
            "csecret",
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(blob.access_token(), Some("CKTx1"));
        assert_eq!(blob.refresh_token.as_deref(), Some("na1-abc"));
        assert_eq!(blob.expires_in, Some(1800));
        assert_eq!(blob.token_type.as_deref(), Some("bearer"));
    }

    #[tokio::test]
    async fn test_exchange_rejected_is_upstream_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/v1/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "BAD_AUTH_CODE"}"#)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let token_url = format!("{}/oauth/v1/token", server.url());
        let err = exchange_code_for_token(&client, &token_url, "bad", "cb", "cid", "cs")
            .await
            .unwrap_err();

        assert!(matches!(err, IntegrationError::Upstream(_)));
        assert_eq!(err.to_string(), "Failed to exchange code for token");
    }

    #[tokio::test]
    async fn test_exchange_non_json_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/v1/token")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let token_url = format!("{}/oauth/v1/token", server.url());
        let err = exchange_code_for_token(&client, &token_url, "c", "cb", "cid", "cs")
            .await
            .unwrap_err();

        assert!(matches!(err, IntegrationError::Upstream(_)));
    }
}
