//! Suspicious entity repository.

use std::sync::Arc;

use crate::entities::{SuspiciousEntity, suspicious_entity};
use cybersecure_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

/// Suspicious entity repository for database operations.
#[derive(Clone)]
pub struct SuspiciousEntityRepository {
    db: Arc<DatabaseConnection>,
}

impl SuspiciousEntityRepository {
    /// Create a new suspicious entity repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a report by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<suspicious_entity::Model>> {
        SuspiciousEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a report by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<suspicious_entity::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Suspicious entity report {id} not found")))
    }

    /// Reports filed by a user, newest first.
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<suspicious_entity::Model>> {
        SuspiciousEntity::find()
            .filter(suspicious_entity::Column::UserId.eq(user_id))
            .order_by_desc(suspicious_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every report, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<suspicious_entity::Model>> {
        SuspiciousEntity::find()
            .order_by_desc(suspicious_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new report.
    pub async fn create(
        &self,
        model: suspicious_entity::ActiveModel,
    ) -> AppResult<suspicious_entity::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a report.
    pub async fn update(
        &self,
        model: suspicious_entity::ActiveModel,
    ) -> AppResult<suspicious_entity::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::{ReportStatus, Severity};
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_report(user_id: Uuid, value: &str, age_minutes: i64) -> suspicious_entity::Model {
        let at = Utc::now() - Duration::minutes(age_minutes);
        suspicious_entity::Model {
            id: Uuid::new_v4(),
            user_id,
            entity_type: "phone_number".to_string(),
            entity_value: value.to_string(),
            description: "Caller claimed to be from the bank".to_string(),
            evidence_files: serde_json::json!(["u/a.png"]),
            threat_level: Severity::High,
            status: ReportStatus::Pending,
            admin_notes: None,
            created_at: at.into(),
            updated_at: at.into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let user_id = Uuid::new_v4();
        let newer = create_test_report(user_id, "+91 98000 00001", 1);
        let older = create_test_report(user_id, "+91 98000 00002", 10);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[newer.clone(), older.clone()]])
                .into_connection(),
        );

        let repo = SuspiciousEntityRepository::new(db);
        let reports = repo.find_by_user(user_id).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.user_id == user_id));
        assert_eq!(reports[0].entity_value, "+91 98000 00001");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<suspicious_entity::Model>::new()])
                .into_connection(),
        );

        let repo = SuspiciousEntityRepository::new(db);
        let result = repo.get_by_id(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
