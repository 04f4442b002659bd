//! Suspicious entity report.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::report_status::{ReportStatus, Severity};

/// A report about a suspicious phone number, URL, email address, etc.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suspicious_entities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// Kind of entity, e.g. `phone_number` or `website`.
    pub entity_type: String,
    pub entity_value: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub evidence_files: Json,
    pub threat_level: Severity,
    pub status: ReportStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
