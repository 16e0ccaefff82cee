//! SeaORM implementation of PartnerRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use tracing::debug;

use crate::domain::partner::{
    Credentials, Partner, PartnerRepository, PartnerStatus, PartnerType,
};
use crate::infrastructure::database::entities::partner;
use crate::shared::{CallContext, DomainError, DomainResult};

pub struct SeaOrmPartnerRepository {
    db: DatabaseConnection,
}

impl SeaOrmPartnerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn db_err(e: DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::Conflict("partner with this ID or token already exists".into())
        }
        _ => DomainError::Internal(format!("Database error: {}", e)),
    }
}

fn corrupt(field: &str, value: &str) -> DomainError {
    DomainError::Internal(format!("Stored partner has invalid {}: {}", field, value))
}

fn credentials_to_json(credentials: &Credentials) -> DomainResult<String> {
    serde_json::to_string(credentials)
        .map_err(|e| DomainError::Internal(format!("Serialization error: {}", e)))
}

fn partner_from_model(model: partner::Model) -> DomainResult<Partner> {
    let partner_type = PartnerType::parse(&model.partner_type)
        .ok_or_else(|| corrupt("type", &model.partner_type))?;
    let status =
        PartnerStatus::parse(&model.status).ok_or_else(|| corrupt("status", &model.status))?;
    let credentials: Credentials = serde_json::from_str(&model.credentials)
        .map_err(|e| DomainError::Internal(format!("Serialization error: {}", e)))?;

    Ok(Partner {
        id: Some(i64::from(model.id)),
        partner_id: model.partner_id,
        name: model.name,
        partner_type,
        credentials,
        hub_token: model.hub_token,
        status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

#[async_trait]
impl PartnerRepository for SeaOrmPartnerRepository {
    async fn create(&self, ctx: &CallContext, partner: Partner) -> DomainResult<Partner> {
        let credentials = credentials_to_json(&partner.credentials)?;
        let now = Utc::now();
        let model = partner::ActiveModel {
            id: NotSet,
            partner_id: Set(partner.partner_id),
            name: Set(partner.name),
            partner_type: Set(partner.partner_type.as_str().to_string()),
            credentials: Set(credentials),
            hub_token: Set(partner.hub_token),
            status: Set(partner.status.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        ctx.run("create", async {
            let stored = model.insert(&self.db).await.map_err(db_err)?;
            debug!(partner_id = %stored.partner_id, id = stored.id, "Partner row inserted");
            partner_from_model(stored)
        })
        .await
    }

    async fn find_by_partner_id(
        &self,
        ctx: &CallContext,
        partner_id: &str,
    ) -> DomainResult<Partner> {
        ctx.run("find_by_partner_id", async {
            let model = partner::Entity::find()
                .filter(partner::Column::PartnerId.eq(partner_id))
                .one(&self.db)
                .await
                .map_err(db_err)?
                .ok_or_else(|| DomainError::partner_not_found("partner_id", partner_id))?;
            partner_from_model(model)
        })
        .await
    }

    async fn find_by_token(&self, ctx: &CallContext, token: &str) -> DomainResult<Partner> {
        ctx.run("find_by_token", async {
            let model = partner::Entity::find()
                .filter(partner::Column::HubToken.eq(token))
                .one(&self.db)
                .await
                .map_err(db_err)?
                .ok_or_else(|| DomainError::partner_not_found("hub_token", "<redacted>"))?;
            partner_from_model(model)
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
        let credentials = credentials_to_json(&partner.credentials)?;

        ctx.run("update", async {
            // One UPDATE statement, matched on the token the caller read:
            // a concurrent rotation or re-registration leaves zero rows.
            let result = partner::Entity::update_many()
                .col_expr(partner::Column::Name, Expr::value(partner.name))
                .col_expr(partner::Column::Credentials, Expr::value(credentials))
                .col_expr(partner::Column::HubToken, Expr::value(partner.hub_token))
                .col_expr(partner::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(partner::Column::PartnerId.eq(partner_id))
                .filter(partner::Column::HubToken.eq(current_token))
                .exec(&self.db)
                .await
                .map_err(db_err)?;

            if result.rows_affected == 0 {
                return Err(DomainError::partner_not_found("partner_id", partner_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, ctx: &CallContext, partner_id: &str) -> DomainResult<()> {
        ctx.run("delete", async {
            let result = partner::Entity::delete_many()
                .filter(partner::Column::PartnerId.eq(partner_id))
                .exec(&self.db)
                .await
                .map_err(db_err)?;

            if result.rows_affected == 0 {
                return Err(DomainError::partner_not_found("partner_id", partner_id));
            }
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
            let result = partner::Entity::update_many()
                .col_expr(partner::Column::Status, Expr::value(status.as_str()))
                .col_expr(partner::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(partner::Column::PartnerId.eq(partner_id))
                .exec(&self.db)
                .await
                .map_err(db_err)?;

            if result.rows_affected == 0 {
                return Err(DomainError::partner_not_found("partner_id", partner_id));
            }
            Ok(())
        })
        .await
    }

    async fn list(&self, ctx: &CallContext, offset: u64, limit: u64) -> DomainResult<Vec<Partner>> {
        ctx.run("list", async {
            partner::Entity::find()
                .order_by_desc(partner::Column::CreatedAt)
                .order_by_desc(partner::Column::Id)
                .offset(offset)
                .limit(limit)
                .all(&self.db)
                .await
                .map_err(db_err)?
                .into_iter()
                .map(partner_from_model)
                .collect()
        })
        .await
    }

    async fn count(&self, ctx: &CallContext) -> DomainResult<u64> {
        ctx.run("count", async {
            partner::Entity::find().count(&self.db).await.map_err(db_err)
        })
        .await
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;
    use tokio::task::JoinSet;

    use super::*;
    use crate::domain::partner::{
        BusinessDetails, CredentialRole, CredentialsRequest, Role,
    };
    use crate::infrastructure::database::migrator::Migrator;

    async fn repo() -> SeaOrmPartnerRepository {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmPartnerRepository::new(db)
    }

    fn partner(party: &str, country: &str, hub_token: &str) -> Partner {
        Partner::register(
            CredentialsRequest {
                token: format!("partner-{party}"),
                url: "https://partner.example/ocpi".into(),
                roles: vec![CredentialRole::new(Role::Cpo, party, country)
                    .with_business_details(BusinessDetails::named(format!("{party} Charging")))],
            },
            PartnerType::Cpo,
            hub_token.into(),
            "2.3",
        )
    }

    #[tokio::test]
    async fn create_then_find_by_both_keys() {
        let repo = repo().await;
        let ctx = CallContext::new();

        let stored = repo.create(&ctx, partner("ABC", "DE", "tok-1")).await.unwrap();
        assert!(stored.id.is_some());
        assert_eq!(stored.name, "ABC Charging");

        let by_id = repo.find_by_partner_id(&ctx, "DE-ABC").await.unwrap();
        assert_eq!(by_id.credentials.roles[0].party_id, "ABC");
        assert_eq!(by_id.credentials.token, "partner-ABC");
        assert_eq!(by_id.status, PartnerStatus::Active);

        let by_token = repo.find_by_token(&ctx, "tok-1").await.unwrap();
        assert_eq!(by_token.partner_id, "DE-ABC");
    }

    #[tokio::test]
    async fn unique_indexes_surface_as_conflict() {
        let repo = repo().await;
        let ctx = CallContext::new();
        repo.create(&ctx, partner("ABC", "DE", "tok-1")).await.unwrap();

        let same_id = repo.create(&ctx, partner("ABC", "DE", "tok-2")).await.unwrap_err();
        let same_token = repo.create(&ctx, partner("XYZ", "NL", "tok-1")).await.unwrap_err();
        assert!(same_id.is_conflict(), "{same_id:?}");
        assert!(same_token.is_conflict(), "{same_token:?}");
        assert_eq!(repo.count(&ctx).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_replaces_document_and_token() {
        let repo = repo().await;
        let ctx = CallContext::new();
        let mut stored = repo.create(&ctx, partner("ABC", "DE", "old")).await.unwrap();

        stored.hub_token = "new".into();
        stored.credentials.url = "https://moved.example/ocpi".into();
        repo.update(&ctx, "DE-ABC", "old", stored.clone()).await.unwrap();

        assert!(repo.find_by_token(&ctx, "old").await.unwrap_err().is_not_found());
        let after = repo.find_by_token(&ctx, "new").await.unwrap();
        assert_eq!(after.credentials.url, "https://moved.example/ocpi");
        assert_eq!(after.id, stored.id);
        assert_eq!(after.created_at, stored.created_at);
    }

    #[tokio::test]
    async fn update_onto_foreign_token_conflicts() {
        let repo = repo().await;
        let ctx = CallContext::new();
        repo.create(&ctx, partner("ABC", "DE", "tok-a")).await.unwrap();
        let mut other = repo.create(&ctx, partner("XYZ", "NL", "tok-b")).await.unwrap();

        other.hub_token = "tok-a".into();
        assert!(repo
            .update(&ctx, "NL-XYZ", "tok-b", other)
            .await
            .unwrap_err()
            .is_conflict());
    }

    #[tokio::test]
    async fn update_matches_on_current_token_only() {
        let repo = repo().await;
        let ctx = CallContext::new();
        let mut snapshot = repo.create(&ctx, partner("ABC", "DE", "old")).await.unwrap();
        repo.update_status(&ctx, "DE-ABC", PartnerStatus::Suspended)
            .await
            .unwrap();

        let mut first = snapshot.clone();
        first.hub_token = "first".into();
        repo.update(&ctx, "DE-ABC", "old", first).await.unwrap();

        snapshot.hub_token = "second".into();
        let err = repo.update(&ctx, "DE-ABC", "old", snapshot).await.unwrap_err();
        assert!(err.is_not_found(), "{err:?}");

        let after = repo.find_by_partner_id(&ctx, "DE-ABC").await.unwrap();
        assert_eq!(after.hub_token, "first");
        assert_eq!(after.status, PartnerStatus::Suspended);
    }

    #[tokio::test]
    async fn writes_against_missing_partner_are_not_found() {
        let repo = repo().await;
        let ctx = CallContext::new();

        assert!(repo
            .update(&ctx, "DE-ABC", "tok", partner("ABC", "DE", "tok"))
            .await
            .unwrap_err()
            .is_not_found());
        assert!(repo.delete(&ctx, "DE-ABC").await.unwrap_err().is_not_found());
        assert!(repo
            .update_status(&ctx, "DE-ABC", PartnerStatus::Inactive)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn status_change_and_delete() {
        let repo = repo().await;
        let ctx = CallContext::new();
        repo.create(&ctx, partner("ABC", "DE", "tok")).await.unwrap();

        repo.update_status(&ctx, "DE-ABC", PartnerStatus::Suspended)
            .await
            .unwrap();
        let suspended = repo.find_by_token(&ctx, "tok").await.unwrap();
        assert_eq!(suspended.status, PartnerStatus::Suspended);

        repo.delete(&ctx, "DE-ABC").await.unwrap();
        assert_eq!(repo.count(&ctx).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_pages_newest_first() {
        let repo = repo().await;
        let ctx = CallContext::new();
        for (i, party) in ["AAA", "BBB", "CCC", "DDD"].iter().enumerate() {
            repo.create(&ctx, partner(party, "DE", &format!("tok-{i}")))
                .await
                .unwrap();
        }

        let first = repo.list(&ctx, 0, 2).await.unwrap();
        let second = repo.list(&ctx, 2, 2).await.unwrap();
        let ids: Vec<_> = first
            .iter()
            .chain(second.iter())
            .map(|p| p.partner_id.as_str())
            .collect();
        assert_eq!(ids, ["DE-DDD", "DE-CCC", "DE-BBB", "DE-AAA"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_creates_for_one_identity_have_one_winner() {
        let repo = Arc::new(repo().await);
        let mut set = JoinSet::new();
        for i in 0..8 {
            let repo = Arc::clone(&repo);
            set.spawn(async move {
                repo.create(&CallContext::new(), partner("ABC", "DE", &format!("tok-{i}")))
                    .await
            });
        }

        let mut won = 0;
        let mut conflicts = 0;
        while let Some(result) = set.join_next().await {
            match result.unwrap() {
                Ok(_) => won += 1,
                Err(e) if e.is_conflict() => conflicts += 1,
                Err(e) => panic!("unexpected error: {e:?}"),
            }
        }
        assert_eq!((won, conflicts), (1, 7));
    }
}
