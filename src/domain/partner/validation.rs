//! Role and identifier checks for credentials
//!
//! Rules are applied role by role in list order and the first violation is
//! returned. Values are compared raw: no trimming, no case folding.

use crate::shared::types::{DomainError, DomainResult};

use super::model::{CredentialRole, PartnerType};

pub const COUNTRY_CODE_LEN: usize = 2;
pub const PARTY_ID_LEN: usize = 3;

pub fn validate_roles(roles: &[CredentialRole], partner_type: PartnerType) -> DomainResult<()> {
    if roles.is_empty() {
        return Err(DomainError::Validation("at least one role required".into()));
    }

    let required = partner_type.required_role();
    for role in roles {
        if role.role != required {
            return Err(DomainError::Validation(format!(
                "{partner_type} partner must have {required} role"
            )));
        }
        if role.country_code.chars().count() != COUNTRY_CODE_LEN {
            return Err(DomainError::Validation(
                "country code must be 2 characters".into(),
            ));
        }
        if role.party_id.chars().count() != PARTY_ID_LEN {
            return Err(DomainError::Validation("party ID must be 3 characters".into()));
        }
    }

    Ok(())
}
