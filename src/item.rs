//! Normalized representation of a third-party CRM record.

use serde::{Deserialize, Serialize};

/// A CRM record reduced to the metadata every integration shares.
///
/// Timestamps are passed through exactly as the provider reports them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub creation_time: Option<String>,
    pub last_modified_time: Option<String>,
    pub url: String,
}
