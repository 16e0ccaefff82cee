//! Partner entity for database

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Partner model
///
/// `partner_id` and `hub_token` carry unique indexes (see the
/// `create_partners` migration); `status` has a plain index for
/// administrative scans.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partners")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub partner_id: String,
    pub name: String,
    /// "CPO" | "EMSP"
    pub partner_type: String,
    /// JSON document: token, url, roles, version
    #[sea_orm(column_type = "Text")]
    pub credentials: String,
    #[sea_orm(unique)]
    pub hub_token: String,
    /// "ACTIVE" | "INACTIVE" | "SUSPENDED"
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
