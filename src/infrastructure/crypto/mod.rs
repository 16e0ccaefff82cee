//! Cryptographic helpers

pub mod token;

pub use token::{generate_token, OsTokenIssuer, TokenIssuer};
