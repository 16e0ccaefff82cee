//! # ChargeSphere OCPI Hub
//!
//! Credentials handshake for an OCPI hub: CPOs and eMSPs register with the
//! hub, receive a hub-issued token, rotate it and deregister. Every other
//! partner-facing call is authenticated against that token.
//!
//! ## Architecture
//!
//! - **domain**: partner entities, role validation, directory trait
//! - **application**: the credentials service
//! - **infrastructure**: token minting, SeaORM and in-memory directories
//! - **interfaces**: OCPI HTTP API with Swagger documentation
//! - **shared**: errors, call context, pagination, shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use application::{CredentialsService, HubSettings};
pub use infrastructure::{init_database, DatabaseConfig, SeaOrmPartnerRepository};
pub use interfaces::create_api_router;
