//! HTTP interface: the OCPI endpoints partners call
//!
//! - `common`: response envelope, error mapping, validated JSON extractor
//! - `middleware`: token authentication and role gates
//! - `modules`: credentials, versions, health, metrics, request id
//! - `router`: route table with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, OcpiAppState};
