//! Connector Manager - CRM connectors and the HTTP surface around them.
//!
//! # Architecture
//!
//! ```text
//!   Frontend (popup + data form)
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │   crm_bridge OAuth routes                │
//! │  - authorize / oauth2callback            │
//! │  - one-shot credential pickup            │
//! └─────────────────────────────────────────┘
//!          ↓ credentials posted back
//! ┌─────────────────────────────────────────┐
//! │       Connector (implements trait)       │
//! │  - Page through the CRM API              │
//! │  - Normalize into IntegrationItems       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Core Types
//!
//! - [`Connector`] - Trait that all connectors implement
//! - [`HubSpotConnector`] - Contacts, companies and deals from HubSpot
//! - [`IntegrationItem`] - Re-exported from crm_bridge (item format)

mod connector;
pub mod api;
pub mod connectors;

pub use connector::Connector;
pub use connectors::hubspot::HubSpotConnector;

// Re-export shared types from crm_bridge for convenience
pub use crm_bridge::credentials::CredentialBlob;
pub use crm_bridge::IntegrationItem;
