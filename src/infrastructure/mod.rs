//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod storage;

pub use crypto::{OsTokenIssuer, TokenIssuer};
pub use database::{init_database, DatabaseConfig, SeaOrmPartnerRepository};
pub use storage::InMemoryPartnerRepository;
