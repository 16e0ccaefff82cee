//! Partner aggregate
//!
//! Contains the Partner entity, credential role validation, and the
//! partner directory interface.

pub mod model;
pub mod repository;
pub mod validation;

pub use model::{
    derive_partner_id, extract_business_name, BusinessDetails, CredentialRole, Credentials,
    CredentialsRequest, CredentialsResponse, Image, ImageCategory, Partner, PartnerStatus,
    PartnerType, Role,
};
pub use repository::PartnerRepository;
pub use validation::validate_roles;
