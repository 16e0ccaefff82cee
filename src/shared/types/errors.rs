use thiserror::Error;

/// Error taxonomy shared by the validator, the partner directory and the
/// credentials service.
///
/// The display text is the human-readable message that ends up in the
/// OCPI envelope, so variants carry the message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{entity} not found")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Internal(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("operation canceled")]
    Canceled,
}

impl DomainError {
    pub fn partner_not_found(field: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "partner",
            field,
            value: value.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
