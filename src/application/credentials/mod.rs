//! Credentials module: the OCPI registration handshake

pub mod service;

pub use service::{CredentialsService, HubSettings, MAX_TOKEN_ATTEMPTS};
