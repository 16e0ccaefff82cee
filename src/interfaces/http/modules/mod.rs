pub mod credentials;
pub mod health;
pub mod metrics;
pub mod request_id;
pub mod versions;
