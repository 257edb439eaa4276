use async_trait::async_trait;
use crm_bridge::credentials::CredentialBlob;
use crm_bridge::{IntegrationItem, IntegrationResult};

/// A CRM integration that turns stored credentials into integration items.
///
/// # Contract
///
/// - `fetch` fails only when the credentials themselves are unusable;
///   trouble with an individual object type is logged and that type skipped.
/// - Items come back in object-type order, provider order within a type.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Unique identifier for this connector (e.g., "hubspot").
    fn name(&self) -> &str;

    /// Fetch and normalize every supported object type.
    async fn fetch(&self, credentials: &CredentialBlob) -> IntegrationResult<Vec<IntegrationItem>>;
}

