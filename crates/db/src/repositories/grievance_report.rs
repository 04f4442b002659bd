//! Grievance report repository.

use std::sync::Arc;

use crate::entities::{GrievanceReport, grievance_report};
use cybersecure_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

/// Grievance report repository for database operations.
#[derive(Clone)]
pub struct GrievanceReportRepository {
    db: Arc<DatabaseConnection>,
}

impl GrievanceReportRepository {
    /// Create a new grievance report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a report by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<grievance_report::Model>> {
        GrievanceReport::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a report by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<grievance_report::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Grievance report {id} not found")))
    }

    /// Reports filed by a user, newest first.
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<grievance_report::Model>> {
        GrievanceReport::find()
            .filter(grievance_report::Column::UserId.eq(user_id))
            .order_by_desc(grievance_report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every report, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<grievance_report::Model>> {
        GrievanceReport::find()
            .order_by_desc(grievance_report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new report.
    pub async fn create(
        &self,
        model: grievance_report::ActiveModel,
    ) -> AppResult<grievance_report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a report.
    pub async fn update(
        &self,
        model: grievance_report::ActiveModel,
    ) -> AppResult<grievance_report::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
