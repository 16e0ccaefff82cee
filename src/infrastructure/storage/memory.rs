//! In-memory partner directory
//!
//! Both unique indexes live behind one lock, so a create or update checks
//! and writes them in a single critical section: two racing registrations
//! for the same identity cannot both succeed.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::partner::{Partner, PartnerRepository, PartnerStatus};
use crate::shared::{CallContext, DomainError, DomainResult};

#[derive(Default)]
struct Directory {
    next_id: i64,
    /// partner_id -> record
    partners: HashMap<String, Partner>,
    /// hub_token -> partner_id
    tokens: HashMap<String, String>,
}

/// In-memory partner directory for development and testing
#[derive(Default)]
pub struct InMemoryPartnerRepository {
    inner: RwLock<Directory>,
}

impl InMemoryPartnerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate() -> DomainError {
    DomainError::Conflict("partner with this ID or token already exists".into())
}

#[async_trait]
impl PartnerRepository for InMemoryPartnerRepository {
    async fn create(&self, ctx: &CallContext, partner: Partner) -> DomainResult<Partner> {
        ctx.run("create", async {
            let mut dir = self.inner.write().await;
            if dir.partners.contains_key(&partner.partner_id)
                || dir.tokens.contains_key(&partner.hub_token)
            {
                return Err(duplicate());
            }

            dir.next_id += 1;
            let now = Utc::now();
            let stored = Partner {
                id: Some(dir.next_id),
                created_at: now,
                updated_at: now,
                ..partner
            };
            dir.tokens
                .insert(stored.hub_token.clone(), stored.partner_id.clone());
            dir.partners
                .insert(stored.partner_id.clone(), stored.clone());
            debug!(partner_id = %stored.partner_id, "Partner stored in memory");
            Ok(stored)
        })
        .await
    }

    async fn find_by_partner_id(
        &self,
        ctx: &CallContext,
        partner_id: &str,
    ) -> DomainResult<Partner> {
        ctx.run("find_by_partner_id", async {
            let dir = self.inner.read().await;
            dir.partners
                .get(partner_id)
                .cloned()
                .ok_or_else(|| DomainError::partner_not_found("partner_id", partner_id))
        })
        .await
    }

    async fn find_by_token(&self, ctx: &CallContext, token: &str) -> DomainResult<Partner> {
        ctx.run("find_by_token", async {
            let dir = self.inner.read().await;
            dir.tokens
                .get(token)
                .and_then(|id| dir.partners.get(id))
                .cloned()
                .ok_or_else(|| DomainError::partner_not_found("hub_token", "<redacted>"))
        })
        .await
    }

    async fn update(
        &self,
        ctx: &CallContext,
        partner_id: &str,
        current_token: &str,
        partner: Partner,
    ) -> DomainResult<()> {
        ctx.run("update", async {
            let mut dir = self.inner.write().await;
            let current = match dir.partners.get(partner_id) {
                Some(current) if current.hub_token == current_token => current,
                _ => return Err(DomainError::partner_not_found("partner_id", partner_id)),
            };
            if let Some(owner) = dir.tokens.get(&partner.hub_token) {
                if owner != partner_id {
                    return Err(duplicate());
                }
            }

            let old_token = current.hub_token.clone();
            let stored = Partner {
                id: current.id,
                partner_id: current.partner_id.clone(),
                partner_type: current.partner_type,
                status: current.status,
                created_at: current.created_at,
                updated_at: Utc::now(),
                ..partner
            };

            dir.tokens.remove(&old_token);
            dir.tokens
                .insert(stored.hub_token.clone(), stored.partner_id.clone());
            dir.partners.insert(stored.partner_id.clone(), stored);
            Ok(())
        })
        .await
    }

    async fn delete(&self, ctx: &CallContext, partner_id: &str) -> DomainResult<()> {
        ctx.run("delete", async {
            let mut dir = self.inner.write().await;
            let removed = dir
                .partners
                .remove(partner_id)
                .ok_or_else(|| DomainError::partner_not_found("partner_id", partner_id))?;
            dir.tokens.remove(&removed.hub_token);
            Ok(())
        })
        .await
    }

    async fn update_status(
        &self,
        ctx: &CallContext,
        partner_id: &str,
        status: PartnerStatus,
    ) -> DomainResult<()> {
        ctx.run("update_status", async {
            let mut dir = self.inner.write().await;
            let partner = dir
                .partners
                .get_mut(partner_id)
                .ok_or_else(|| DomainError::partner_not_found("partner_id", partner_id))?;
            partner.status = status;
            partner.updated_at = Utc::now();
            Ok(())
        })
        .await
    }

    async fn list(&self, ctx: &CallContext, offset: u64, limit: u64) -> DomainResult<Vec<Partner>> {
        ctx.run("list", async {
            let dir = self.inner.read().await;
            let mut partners: Vec<Partner> = dir.partners.values().cloned().collect();
            partners.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(partners
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect())
        })
        .await
    }

    async fn count(&self, ctx: &CallContext) -> DomainResult<u64> {
        ctx.run("count", async { Ok(self.inner.read().await.partners.len() as u64) })
            .await
    }
}

// ── Tests ──────────────────────────────────────────────────────
