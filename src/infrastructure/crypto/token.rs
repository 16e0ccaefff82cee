//! Hub token minting

use rand::rngs::OsRng;
use rand::RngCore;

use crate::shared::{DomainError, DomainResult};

/// Random bytes per token (hex-encoded to 64 characters)
pub const TOKEN_BYTES: usize = 32;

/// Source of opaque bearer tokens.
///
/// Implementations make no uniqueness promise; the partner directory's
/// unique index on the hub token is what rejects a collision.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self) -> DomainResult<String>;
}

/// Tokens drawn from the operating system's secure random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsTokenIssuer;

impl TokenIssuer for OsTokenIssuer {
    fn issue(&self) -> DomainResult<String> {
        generate_token()
    }
}

/// 32 bytes from the OS RNG, lower-case hex.
pub fn generate_token() -> DomainResult<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| DomainError::Internal(format!("failed to generate token: {e}")))?;
    Ok(hex::encode(bytes))
}
