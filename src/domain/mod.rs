//! Domain layer: partner entities, validation rules and the directory port

pub mod partner;

pub use partner::{
    BusinessDetails, CredentialRole, Credentials, CredentialsRequest, CredentialsResponse,
    Partner, PartnerRepository, PartnerStatus, PartnerType, Role,
};

pub use crate::shared::types::{DomainError, DomainResult};
