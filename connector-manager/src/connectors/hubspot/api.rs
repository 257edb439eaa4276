use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

/// One page of the CRM object listing.
#[derive(Debug, Deserialize)]
pub struct ObjectPage {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<NextPage>,
}

#[derive(Debug, Deserialize)]
pub struct NextPage {
    #[serde(default)]
    pub after: Option<String>,
}

impl ObjectPage {
    /// Cursor for the following page, if there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.as_ref())
            .and_then(|n| n.after.as_deref())
            .filter(|after| !after.is_empty())
    }
}

/// Builds the HTTP client shared by all HubSpot requests.
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .user_agent("crm-bridge-connector/1.0")
        .build()
        .context("Failed to build HTTP client")
}

/// HTTP client for the HubSpot CRM v3 API.
///
/// Authenticates with a Bearer token.
pub struct HubSpotClient {
    access_token: String,
    http_client: Client,
    base_url: String,
}

impl HubSpotClient {
    pub fn new(http_client: Client, base_url: String, access_token: String) -> Self {
        Self {
            access_token,
            http_client,
            base_url,
        }
    }

    /// Fetch every object of `object_type` (e.g. "contacts"), following the
    /// `after` cursor until the last page.
    ///
    /// A non-success status ends pagination early: it is logged and the
    /// objects gathered so far are returned. Transport and decode failures
    /// are errors.
    pub async fn fetch_objects(&self, object_type: &str, limit: u32) -> Result<Vec<Value>> {
        let url = format!("{}/crm/v3/objects/{}", self.base_url, object_type);
        let mut objects = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut params = vec![("limit", limit.to_string())];
            if let Some(cursor) = &after {
                params.push(("after", cursor.clone()));
            }

            let response = self
                .http_client
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(&params)
                .send()
                .await
                .with_context(|| format!("Failed to send fetch {} request", object_type))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(
                    object_type = %object_type,
                    status = %status,
                    body = %body,
                    fetched = objects.len(),
                    "HubSpot API error, stopping pagination"
                );
                break;
            }

            let page: ObjectPage = response
                .json()
                .await
                .with_context(|| format!("Failed to parse {} response", object_type))?;

            let next = page.next_cursor().map(str::to_string);
            objects.extend(page.results);

            match next {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        tracing::debug!(object_type = %object_type, count = objects.len(), "Fetched HubSpot objects");
        Ok(objects)
    }
}
