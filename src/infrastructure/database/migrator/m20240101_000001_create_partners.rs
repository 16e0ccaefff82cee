//! Create partners table migration

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Partners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Partners::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Partners::PartnerId).string_len(16).not_null())
                    .col(ColumnDef::new(Partners::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Partners::PartnerType).string_len(8).not_null())
                    .col(ColumnDef::new(Partners::Credentials).text().not_null())
                    .col(ColumnDef::new(Partners::HubToken).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Partners::Status)
                            .string_len(16)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(
                        ColumnDef::new(Partners::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Partners::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Identity: one record per countryCode-partyId
        manager
            .create_index(
                Index::create()
                    .name("idx_partners_partner_id")
                    .table(Partners::Table)
                    .col(Partners::PartnerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Bearer lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_partners_hub_token")
                    .table(Partners::Table)
                    .col(Partners::HubToken)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_partners_status")
                    .table(Partners::Table)
                    .col(Partners::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Partners::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Partners {
    Table,
    Id,
    PartnerId,
    Name,
    PartnerType,
    Credentials,
    HubToken,
    Status,
    CreatedAt,
    UpdatedAt,
}
