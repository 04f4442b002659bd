//! Grievance report entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::report_status::{ReportStatus, Severity};

/// A cybersecurity grievance filed by a user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grievance_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Reporting user.
    pub user_id: Uuid,
    pub title: String,
    pub complaint_category: String,
    pub subcategory: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub location: String,
    /// Storage paths of attached evidence (JSON array of strings).
    #[sea_orm(column_type = "JsonBinary")]
    pub evidence_files: Json,
    pub priority_level: Severity,
    pub status: ReportStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
