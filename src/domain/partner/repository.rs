//! Partner directory interface

use async_trait::async_trait;

use crate::shared::{CallContext, DomainResult};

use super::model::{Partner, PartnerStatus};

/// Durable store of partner records.
///
/// `partner_id` and `hub_token` are each unique across the whole directory.
/// A write that would break either constraint fails with a single
/// `DomainError::Conflict`, whichever key collided. Lookups that miss fail
/// with `DomainError::NotFound`.
#[async_trait]
pub trait PartnerRepository: Send + Sync {
    /// Insert a new record. Assigns the surrogate id and both timestamps.
    async fn create(&self, ctx: &CallContext, partner: Partner) -> DomainResult<Partner>;

    async fn find_by_partner_id(&self, ctx: &CallContext, partner_id: &str)
        -> DomainResult<Partner>;

    async fn find_by_token(&self, ctx: &CallContext, token: &str) -> DomainResult<Partner>;

    /// Replace the name, credentials and hub token of the record keyed by
    /// `partner_id`, provided it still holds `current_token`, and refresh
    /// `updated_at`. Type and status are left as stored. Single atomic write;
    /// fails with `NotFound` when no record matches both keys.
    async fn update(
        &self,
        ctx: &CallContext,
        partner_id: &str,
        current_token: &str,
        partner: Partner,
    ) -> DomainResult<()>;

    async fn delete(&self, ctx: &CallContext, partner_id: &str) -> DomainResult<()>;

    async fn update_status(
        &self,
        ctx: &CallContext,
        partner_id: &str,
        status: PartnerStatus,
    ) -> DomainResult<()>;

    /// Newest first.
    async fn list(&self, ctx: &CallContext, offset: u64, limit: u64) -> DomainResult<Vec<Partner>>;

    async fn count(&self, ctx: &CallContext) -> DomainResult<u64>;
}
