pub mod api;
pub mod config;
pub mod transformer;

use crate::Connector;
use anyhow::Result;
use async_trait::async_trait;
use crm_bridge::config::HubSpotConfig;
use crm_bridge::credentials::CredentialBlob;
use crm_bridge::{IntegrationError, IntegrationItem, IntegrationResult};

use self::api::{build_http_client, HubSpotClient};
use self::config::{HubSpotSettings, OBJECT_TYPES};
use self::transformer::object_to_item;

/// HubSpot connector — pulls contacts, companies and deals from the CRM v3
/// API and normalizes them into integration items.
pub struct HubSpotConnector {
    settings: HubSpotSettings,
    http_client: reqwest::Client,
}

impl HubSpotConnector {
    pub fn new(settings: HubSpotSettings) -> Result<Self> {
        Ok(Self {
            settings,
            http_client: build_http_client()?,
        })
    }

    pub fn from_config(config: &HubSpotConfig) -> Result<Self> {
        Self::new(HubSpotSettings::from_config(config))
    }
}

#[async_trait]
impl Connector for HubSpotConnector {
    fn name(&self) -> &str {
        "hubspot"
    }

    async fn fetch(&self, credentials: &CredentialBlob) -> IntegrationResult<Vec<IntegrationItem>> {
        let access_token = credentials.access_token().ok_or_else(|| {
            IntegrationError::Client("No access token found in credentials".to_string())
        })?;

        let client = HubSpotClient::new(
            self.http_client.clone(),
            self.settings.api_base_url.clone(),
            access_token.to_string(),
        );
        let mut items = Vec::new();

        for (object_type, item_type) in OBJECT_TYPES {
            match client.fetch_objects(object_type, self.settings.page_size).await {
                Ok(objects) => {
                    items.extend(
                        objects
                            .iter()
                            .map(|object| object_to_item(object, item_type, &self.settings)),
                    );
                }
                Err(e) => {
                    // Non-fatal: log and continue with remaining object types.
                    tracing::warn!(
                        connector = self.name(),
                        object_type = %object_type,
                        error = %e,
                        "Failed to fetch objects"
                    );
                }
            }
        }

        tracing::info!(connector = self.name(), count = items.len(), "Items loaded");
        Ok(items)
    }
}
