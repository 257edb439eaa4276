use crm_bridge::config::HubSpotConfig;

/// Object types fetched for every integration: (API path segment, item type).
pub const OBJECT_TYPES: &[(&str, &str)] = &[
    ("contacts", "contact"),
    ("companies", "company"),
    ("deals", "deal"),
];

/// API path segment for an item type, taken from [`OBJECT_TYPES`]. Types
/// outside the table get a plain `s` suffix.
pub fn object_path(item_type: &str) -> String {
    OBJECT_TYPES
        .iter()
        .find(|(_, singular)| *singular == item_type)
        .map(|(path, _)| path.to_string())
        .unwrap_or_else(|| format!("{}s", item_type))
}

/// Endpoints and paging used by the HubSpot connector.
#[derive(Clone, Debug)]
pub struct HubSpotSettings {
    /// CRM API base, e.g. `https://api.hubapi.com`
    pub api_base_url: String,
    /// Web app base for record links
    pub app_url: String,
    pub portal_id: String,
    pub page_size: u32,
}

impl HubSpotSettings {
    pub fn from_config(config: &HubSpotConfig) -> Self {
        Self {
            api_base_url: config.api_base_url.clone(),
            app_url: config.app_url.clone(),
            portal_id: config.portal_id.clone(),
            page_size: config.page_size,
        }
    }

    /// Settings pointing the CRM API at a custom base URL (for testing with
    /// a mock server).
    pub fn with_api_base_url(api_base_url: String) -> Self {
        Self {
            api_base_url,
            ..Self::default()
        }
    }

    /// Browser link to a record.
    pub fn record_url(&self, object_type: &str, id: &str) -> String {
        format!(
            "{}/contacts/{}/{}/{}",
            self.app_url, self.portal_id, object_type, id
        )
    }
}

impl Default for HubSpotSettings {
    fn default() -> Self {
        Self::from_config(&HubSpotConfig::default())
    }
}
