//! Partner domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of counterpart registered with the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartnerType {
    /// Charge Point Operator
    #[serde(rename = "CPO")]
    Cpo,
    /// E-Mobility Service Provider
    #[serde(rename = "EMSP")]
    Emsp,
}

impl PartnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpo => "CPO",
            Self::Emsp => "EMSP",
        }
    }

    /// Exact, case-sensitive match on the wire value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CPO" => Some(Self::Cpo),
            "EMSP" => Some(Self::Emsp),
            _ => None,
        }
    }

    /// The only credential role a partner of this type may declare.
    pub fn required_role(&self) -> Role {
        match self {
            Self::Cpo => Role::Cpo,
            Self::Emsp => Role::Emsp,
        }
    }
}

impl std::fmt::Display for PartnerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartnerStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl PartnerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Suspended => "SUSPENDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            "SUSPENDED" => Some(Self::Suspended),
            _ => None,
        }
    }
}

impl std::fmt::Display for PartnerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OCPI role a party plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Cpo,
    Emsp,
    Hub,
    /// Navigation Service Provider
    Nsp,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpo => "CPO",
            Self::Emsp => "EMSP",
            Self::Hub => "HUB",
            Self::Nsp => "NSP",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageCategory {
    Charger,
    Entrance,
    Location,
    Network,
    Operator,
    Other,
    Owner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub category: ImageCategory,
    #[serde(rename = "type")]
    pub image_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDetails {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<Image>,
}

impl BusinessDetails {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            website: None,
            logo: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRole {
    pub role: Role,
    pub party_id: String,
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_details: Option<BusinessDetails>,
}

impl CredentialRole {
    pub fn new(role: Role, party_id: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            role,
            party_id: party_id.into(),
            country_code: country_code.into(),
            business_details: None,
        }
    }

    pub fn with_business_details(mut self, details: BusinessDetails) -> Self {
        self.business_details = Some(details);
        self
    }

    /// `countryCode-partyId`
    pub fn party_key(&self) -> String {
        format!("{}-{}", self.country_code, self.party_id)
    }
}

/// Credentials a partner handed to the hub: the token and URL the hub uses
/// to call the partner back, plus the roles the partner plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub url: String,
    pub roles: Vec<CredentialRole>,
    pub version: String,
}

/// Body of a register / update credentials call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsRequest {
    pub token: String,
    pub url: String,
    pub roles: Vec<CredentialRole>,
}

/// What the hub hands back: the token the partner must present on later
/// calls, the hub base URL and the hub's own role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsResponse {
    pub token: String,
    pub url: String,
    pub roles: Vec<CredentialRole>,
}

/// A registered CPO or eMSP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partner {
    /// Surrogate key, assigned by the directory on create
    pub id: Option<i64>,
    /// `countryCode-partyId` of the first declared role; unique
    pub partner_id: String,
    pub name: String,
    pub partner_type: PartnerType,
    pub credentials: Credentials,
    /// Token the hub issued to this partner; unique
    pub hub_token: String,
    pub status: PartnerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Partner {
    /// Build an ACTIVE partner from a validated request. Timestamps are
    /// placeholders until the directory persists the record.
    pub fn register(
        request: CredentialsRequest,
        partner_type: PartnerType,
        hub_token: String,
        version: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            partner_id: derive_partner_id(&request.roles),
            name: extract_business_name(&request.roles),
            partner_type,
            credentials: Credentials {
                token: request.token,
                url: request.url,
                roles: request.roles,
                version: version.into(),
            },
            hub_token,
            status: PartnerStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the partner-supplied credentials and the hub token in one go.
    pub fn rotate(&mut self, request: CredentialsRequest, hub_token: String) {
        self.name = extract_business_name(&request.roles);
        self.credentials.token = request.token;
        self.credentials.url = request.url;
        self.credentials.roles = request.roles;
        self.hub_token = hub_token;
    }

    pub fn is_active(&self) -> bool {
        self.status == PartnerStatus::Active
    }
}

/// `countryCode-partyId` of the first role. Empty when there are no roles;
/// callers validate first.
pub fn derive_partner_id(roles: &[CredentialRole]) -> String {
    roles.first().map(CredentialRole::party_key).unwrap_or_default()
}

/// Display name: first role carrying a non-empty business name, otherwise
/// the derived partner id.
pub fn extract_business_name(roles: &[CredentialRole]) -> String {
    roles
        .iter()
        .filter_map(|r| r.business_details.as_ref())
        .map(|d| d.name.as_str())
        .find(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| derive_partner_id(roles))
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cpo_role(party: &str, country: &str) -> CredentialRole {
        CredentialRole::new(Role::Cpo, party, country)
    }

    fn request(roles: Vec<CredentialRole>) -> CredentialsRequest {
        CredentialsRequest {
            token: "t1".into(),
            url: "https://a.com".into(),
            roles,
        }
    }

    #[test]
    fn partner_id_comes_from_first_role() {
        let roles = vec![cpo_role("ABC", "DE"), cpo_role("XYZ", "NL")];
        assert_eq!(derive_partner_id(&roles), "DE-ABC");
    }

    #[test]
    fn business_name_prefers_first_non_empty_name() {
        let roles = vec![
            cpo_role("ABC", "DE").with_business_details(BusinessDetails::named("")),
            cpo_role("XYZ", "NL").with_business_details(BusinessDetails::named("Second")),
            cpo_role("QQQ", "FR").with_business_details(BusinessDetails::named("Third")),
        ];
        assert_eq!(extract_business_name(&roles), "Second");
    }

    #[test]
    fn business_name_falls_back_to_partner_id() {
        let roles = vec![cpo_role("ABC", "DE")];
        assert_eq!(extract_business_name(&roles), "DE-ABC");
    }

    #[test]
    fn register_builds_active_partner() {
        let partner = Partner::register(
            request(vec![cpo_role("ABC", "DE")]),
            PartnerType::Cpo,
            "hub-token".into(),
            "2.3",
        );
        assert_eq!(partner.partner_id, "DE-ABC");
        assert_eq!(partner.partner_type, PartnerType::Cpo);
        assert_eq!(partner.credentials.token, "t1");
        assert_eq!(partner.credentials.version, "2.3");
        assert_eq!(partner.hub_token, "hub-token");
        assert!(partner.is_active());
        assert!(partner.id.is_none());
    }

    #[test]
    fn rotate_replaces_credentials_and_hub_token() {
        let mut partner = Partner::register(
            request(vec![cpo_role("ABC", "DE")]),
            PartnerType::Cpo,
            "old".into(),
            "2.3",
        );
        let mut update = request(vec![
            cpo_role("ABC", "DE").with_business_details(BusinessDetails::named("Renamed"))
        ]);
        update.token = "t2".into();
        partner.rotate(update, "new".into());

        assert_eq!(partner.hub_token, "new");
        assert_eq!(partner.credentials.token, "t2");
        assert_eq!(partner.name, "Renamed");
        assert_eq!(partner.partner_id, "DE-ABC");
    }

    #[test]
    fn wire_names_match_ocpi() {
        let role = cpo_role("ABC", "DE");
        let json = serde_json::to_value(&role).unwrap();
        assert_eq!(json["role"], "CPO");
        assert_eq!(json["party_id"], "ABC");
        assert!(json.get("business_details").is_none());

        assert_eq!(serde_json::to_value(Role::Hub).unwrap(), "HUB");
        assert_eq!(serde_json::to_value(PartnerStatus::Suspended).unwrap(), "SUSPENDED");
    }

    #[test]
    fn partner_type_parse_is_exact() {
        assert_eq!(PartnerType::parse("EMSP"), Some(PartnerType::Emsp));
        assert_eq!(PartnerType::parse("emsp"), None);
        assert_eq!(PartnerType::parse(""), None);
        assert_eq!(PartnerStatus::parse("suspended"), Some(PartnerStatus::Suspended));
        assert_eq!(PartnerStatus::parse("gone"), None);
    }
}
