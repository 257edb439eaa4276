// Shared key-value cache (state tokens, credential blobs)
pub mod cache;

// File + environment configuration
pub mod config;

// Error model
pub mod error;

// Credential blobs and single-use storage
pub mod credentials;

// Normalized CRM records
pub mod item;

// HTTP APIs (OAuth flow)
pub mod api;

pub use error::{IntegrationError, IntegrationResult};
pub use item::IntegrationItem;
