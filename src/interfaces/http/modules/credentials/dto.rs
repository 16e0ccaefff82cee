//! Credentials DTOs
//!
//! Wire shape of the OCPI credentials object. Only structural checks run
//! here; role and identifier rules belong to the credentials service so
//! their messages reach the caller unchanged.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::partner::{
    BusinessDetails, CredentialRole, CredentialsRequest, CredentialsResponse, Image,
    ImageCategory, Role,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ImageDto {
    #[validate(url)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// CHARGER, ENTRANCE, LOCATION, NETWORK, OPERATOR, OTHER or OWNER
    #[schema(value_type = String, example = "OPERATOR")]
    pub category: ImageCategory,
    /// Image type, e.g. "png"
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 4))]
    pub image_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct BusinessDetailsDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub logo: Option<ImageDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CredentialRoleDto {
    /// CPO, EMSP, HUB or NSP
    #[schema(value_type = String, example = "CPO")]
    pub role: Role,
    /// ISO-3166 alpha-2 country code
    #[schema(example = "DE")]
    pub country_code: String,
    /// Party identifier, 3 characters
    #[schema(example = "ABC")]
    pub party_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub business_details: Option<BusinessDetailsDto>,
}

/// Credentials object sent by a partner on register / update
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CredentialsDto {
    /// Token the hub must use when calling the partner
    #[validate(length(min = 1, max = 64, message = "token is required"))]
    pub token: String,
    /// Partner's versions endpoint
    #[validate(url(message = "url must be a valid URL"))]
    pub url: String,
    #[validate(nested)]
    pub roles: Vec<CredentialRoleDto>,
}

/// Credentials object returned by the hub
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CredentialsResponseDto {
    /// Token the partner must present on subsequent calls
    pub token: String,
    pub url: String,
    pub roles: Vec<CredentialRoleDto>,
}

// ── Conversions ────────────────────────────────────────────────

impl From<ImageDto> for Image {
    fn from(dto: ImageDto) -> Self {
        Self {
            url: dto.url,
            thumbnail: dto.thumbnail,
            category: dto.category,
            image_type: dto.image_type,
            width: dto.width,
            height: dto.height,
        }
    }
}

impl From<Image> for ImageDto {
    fn from(image: Image) -> Self {
        Self {
            url: image.url,
            thumbnail: image.thumbnail,
            category: image.category,
            image_type: image.image_type,
            width: image.width,
            height: image.height,
        }
    }
}

impl From<BusinessDetailsDto> for BusinessDetails {
    fn from(dto: BusinessDetailsDto) -> Self {
        Self {
            name: dto.name,
            website: dto.website,
            logo: dto.logo.map(Into::into),
        }
    }
}

impl From<BusinessDetails> for BusinessDetailsDto {
    fn from(details: BusinessDetails) -> Self {
        Self {
            name: details.name,
            website: details.website,
            logo: details.logo.map(Into::into),
        }
    }
}

impl From<CredentialRoleDto> for CredentialRole {
    fn from(dto: CredentialRoleDto) -> Self {
        Self {
            role: dto.role,
            party_id: dto.party_id,
            country_code: dto.country_code,
            business_details: dto.business_details.map(Into::into),
        }
    }
}

impl From<CredentialRole> for CredentialRoleDto {
    fn from(role: CredentialRole) -> Self {
        Self {
            role: role.role,
            country_code: role.country_code,
            party_id: role.party_id,
            business_details: role.business_details.map(Into::into),
        }
    }
}

impl From<CredentialsDto> for CredentialsRequest {
    fn from(dto: CredentialsDto) -> Self {
        Self {
            token: dto.token,
            url: dto.url,
            roles: dto.roles.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<CredentialsResponse> for CredentialsResponseDto {
    fn from(response: CredentialsResponse) -> Self {
        Self {
            token: response.token,
            url: response.url,
            roles: response.roles.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_fields_are_not_length_checked_here() {
        let dto: CredentialsDto = serde_json::from_value(serde_json::json!({
            "token": "t1",
            "url": "https://a.com",
            "roles": [{"role": "CPO", "party_id": "ABCD", "country_code": "D"}]
        }))
        .unwrap();
        assert!(dto.validate().is_ok());

        let request = CredentialsRequest::from(dto);
        assert_eq!(request.roles[0].party_id, "ABCD");
    }

    #[test]
    fn structural_checks_reject_bad_url_and_empty_token() {
        let dto: CredentialsDto = serde_json::from_value(serde_json::json!({
            "token": "",
            "url": "not a url",
            "roles": []
        }))
        .unwrap();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("token"));
        assert!(fields.contains_key("url"));
    }

    #[test]
    fn unknown_role_fails_to_deserialize() {
        let result: Result<CredentialsDto, _> = serde_json::from_value(serde_json::json!({
            "token": "t1",
            "url": "https://a.com",
            "roles": [{"role": "OPERATOR", "party_id": "ABC", "country_code": "DE"}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn response_serializes_snake_case_roles() {
        let dto = CredentialsResponseDto::from(CredentialsResponse {
            token: "abc".into(),
            url: "https://hub.example/ocpi/2.3".into(),
            roles: vec![CredentialRole::new(Role::Hub, "HUB", "US")
                .with_business_details(BusinessDetails::named("ChargeSphere Hub"))],
        });
        let json = serde_json::to_value(dto).unwrap();
        assert_eq!(json["roles"][0]["role"], "HUB");
        assert_eq!(json["roles"][0]["party_id"], "HUB");
        assert_eq!(json["roles"][0]["country_code"], "US");
        assert_eq!(json["roles"][0]["business_details"]["name"], "ChargeSphere Hub");
    }
}
