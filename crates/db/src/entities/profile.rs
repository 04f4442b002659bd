//! Profile entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile of an identity-provider user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Identity-provider user ID (unique).
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub organization: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
