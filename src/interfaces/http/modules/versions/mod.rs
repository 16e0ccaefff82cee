//! Versions module: OCPI version discovery

pub mod handlers;

pub use handlers::*;
