//! Application layer - use cases orchestrating domain and infrastructure

pub mod credentials;

pub use credentials::{CredentialsService, HubSettings};
