//! Credential exchange service: application-layer orchestration
//!
//! Registration, retrieval, rotation and deletion of partner credentials,
//! plus token validation for the authentication middleware. HTTP handlers
//! and the CLI are thin wrappers that delegate here.

use std::sync::Arc;

use metrics::counter;
use tracing::{info, warn};

use crate::domain::partner::{
    derive_partner_id, validate_roles, BusinessDetails, CredentialRole, CredentialsRequest,
    CredentialsResponse, Partner, PartnerRepository, PartnerStatus, PartnerType, Role,
};
use crate::infrastructure::crypto::TokenIssuer;
use crate::shared::{
    page_offset, validate_pagination, CallContext, DomainError, DomainResult, PaginatedResult,
};

/// Mint attempts before a token collision is reported as a failure
pub const MAX_TOKEN_ATTEMPTS: u32 = 3;

/// The hub's own identity, handed to partners in every credentials response
#[derive(Debug, Clone)]
pub struct HubSettings {
    /// Versioned base URL, e.g. `https://hub.example.com/ocpi/2.3`
    pub hub_url: String,
    pub version: String,
    pub party_id: String,
    pub country_code: String,
    pub business_name: String,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            hub_url: "http://localhost:8080/ocpi/2.3".into(),
            version: "2.3".into(),
            party_id: "HUB".into(),
            country_code: "US".into(),
            business_name: "ChargeSphere Hub".into(),
        }
    }
}

impl HubSettings {
    /// Credentials payload carrying `token` and the single HUB role.
    pub fn credentials(&self, token: String) -> CredentialsResponse {
        CredentialsResponse {
            token,
            url: self.hub_url.clone(),
            roles: vec![CredentialRole::new(
                Role::Hub,
                self.party_id.clone(),
                self.country_code.clone(),
            )
            .with_business_details(BusinessDetails::named(self.business_name.clone()))],
        }
    }
}

/// Credential exchange service.
///
/// Holds the directory behind its trait so the SeaORM store and the
/// in-memory store are interchangeable.
pub struct CredentialsService {
    repo: Arc<dyn PartnerRepository>,
    issuer: Arc<dyn TokenIssuer>,
    hub: HubSettings,
}

impl CredentialsService {
    pub fn new(
        repo: Arc<dyn PartnerRepository>,
        issuer: Arc<dyn TokenIssuer>,
        hub: HubSettings,
    ) -> Self {
        Self { repo, issuer, hub }
    }

    pub fn hub(&self) -> &HubSettings {
        &self.hub
    }

    // ── Handshake ───────────────────────────────────────────────

    /// Register a new partner and hand back the hub's credentials.
    ///
    /// Re-registration under an existing `countryCode-partyId` is rejected,
    /// never merged. A mint collision on the hub token is retried with a
    /// fresh token up to [`MAX_TOKEN_ATTEMPTS`] times.
    pub async fn register(
        &self,
        ctx: &CallContext,
        request: CredentialsRequest,
        partner_type: PartnerType,
    ) -> DomainResult<CredentialsResponse> {
        validate_roles(&request.roles, partner_type)?;
        let partner_id = derive_partner_id(&request.roles);

        if self.partner_exists(ctx, &partner_id).await? {
            warn!(partner_id = %partner_id, "Registration rejected: identity taken");
            return Err(already_registered(&partner_id));
        }

        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let hub_token = self.issuer.issue()?;
            let partner = Partner::register(
                request.clone(),
                partner_type,
                hub_token.clone(),
                self.hub.version.as_str(),
            );

            match self.repo.create(ctx, partner).await {
                Ok(stored) => {
                    counter!("ocpi_credentials_registered_total").increment(1);
                    info!(
                        partner_id = %stored.partner_id,
                        partner_type = %stored.partner_type,
                        name = %stored.name,
                        "Partner registered"
                    );
                    return Ok(self.hub.credentials(hub_token));
                }
                Err(e) if e.is_conflict() => {
                    // Lost a race for the identity, or the token collided.
                    if self.partner_exists(ctx, &partner_id).await? {
                        warn!(partner_id = %partner_id, "Registration lost race for identity");
                        return Err(already_registered(&partner_id));
                    }
                    warn!(partner_id = %partner_id, attempt, "Hub token collision");
                }
                Err(e) => return Err(e),
            }
        }

        Err(token_exhausted())
    }

    /// Hub credentials for an authenticated partner. The presented token is
    /// echoed back unchanged.
    pub async fn get_credentials(
        &self,
        ctx: &CallContext,
        token: &str,
    ) -> DomainResult<CredentialsResponse> {
        self.validate_token(ctx, token).await?;
        Ok(self.hub.credentials(token.to_string()))
    }

    /// Replace the partner's credentials and rotate the hub token.
    ///
    /// Roles are validated against the type the partner registered with.
    /// The new token and credentials land in one directory write, so the
    /// presented token stops resolving as soon as this returns.
    pub async fn update_credentials(
        &self,
        ctx: &CallContext,
        token: &str,
        request: CredentialsRequest,
    ) -> DomainResult<CredentialsResponse> {
        let current = self.lookup(ctx, token).await?;
        validate_roles(&request.roles, current.partner_type)?;

        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let hub_token = self.issuer.issue()?;
            if hub_token == token {
                continue;
            }

            let mut partner = current.clone();
            partner.rotate(request.clone(), hub_token.clone());

            match self.repo.update(ctx, &current.partner_id, token, partner).await {
                Ok(()) => {
                    counter!("ocpi_credentials_rotated_total").increment(1);
                    info!(partner_id = %current.partner_id, "Partner credentials rotated");
                    return Ok(self.hub.credentials(hub_token));
                }
                Err(e) if e.is_conflict() => {
                    warn!(partner_id = %current.partner_id, attempt, "Hub token collision");
                }
                // The presented token was rotated away or the partner was
                // replaced since the lookup.
                Err(e) if e.is_not_found() => return Err(invalid_token()),
                Err(e) => return Err(e),
            }
        }

        Err(token_exhausted())
    }

    /// Deregister the partner owning `token`.
    pub async fn delete_credentials(&self, ctx: &CallContext, token: &str) -> DomainResult<()> {
        let partner = self.lookup(ctx, token).await?;
        self.repo.delete(ctx, &partner.partner_id).await?;

        counter!("ocpi_credentials_deleted_total").increment(1);
        info!(partner_id = %partner.partner_id, "Partner deregistered");
        Ok(())
    }

    /// Resolve a bearer token to an ACTIVE partner.
    pub async fn validate_token(&self, ctx: &CallContext, token: &str) -> DomainResult<Partner> {
        let partner = self.lookup(ctx, token).await?;
        if !partner.is_active() {
            return Err(DomainError::Unauthorized("partner is not active".into()));
        }
        Ok(partner)
    }

    // ── Administration ──────────────────────────────────────────

    /// Page through the directory, newest registrations first.
    pub async fn list_partners(
        &self,
        ctx: &CallContext,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> DomainResult<PaginatedResult<Partner>> {
        let (page, limit) = validate_pagination(page, limit);
        let total = self.repo.count(ctx).await?;
        let items = self
            .repo
            .list(ctx, page_offset(page, limit), limit)
            .await?;
        Ok(PaginatedResult::new(items, total, page, limit))
    }

    pub async fn set_partner_status(
        &self,
        ctx: &CallContext,
        partner_id: &str,
        status: PartnerStatus,
    ) -> DomainResult<()> {
        self.repo.update_status(ctx, partner_id, status).await?;
        info!(partner_id = %partner_id, status = %status, "Partner status changed");
        Ok(())
    }

    /// Number of registered partners; used by the health probe.
    pub async fn partner_count(&self, ctx: &CallContext) -> DomainResult<u64> {
        self.repo.count(ctx).await
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn lookup(&self, ctx: &CallContext, token: &str) -> DomainResult<Partner> {
        match self.repo.find_by_token(ctx, token).await {
            Err(e) if e.is_not_found() => Err(invalid_token()),
            other => other,
        }
    }

    async fn partner_exists(&self, ctx: &CallContext, partner_id: &str) -> DomainResult<bool> {
        match self.repo.find_by_partner_id(ctx, partner_id).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn already_registered(partner_id: &str) -> DomainError {
    DomainError::Conflict(format!("partner {} already registered", partner_id))
}

fn invalid_token() -> DomainError {
    DomainError::Unauthorized("invalid token".into())
}

fn token_exhausted() -> DomainError {
    DomainError::Internal("failed to issue a unique token".into())
}

// ── Tests ──────────────────────────────────────────────────────
