//! Profile repository.

use std::sync::Arc;

use crate::entities::{Profile, profile};
use cybersecure_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, sea_query::OnConflict,
};
use uuid::Uuid;

/// Profile repository for database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the profile of a user.
    pub async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<profile::Model>> {
        Profile::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the profile of a user, returning an error if it doesn't exist.
    pub async fn get_by_user_id(&self, user_id: Uuid) -> AppResult<profile::Model> {
        self.find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    /// Find the profiles of several users.
    pub async fn find_by_user_ids(&self, user_ids: &[Uuid]) -> AppResult<Vec<profile::Model>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        Profile::find()
            .filter(profile::Column::UserId.is_in(user_ids.iter().copied()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List every profile, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<profile::Model>> {
        Profile::find()
            .order_by_desc(profile::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a profile, or overwrite the mutable fields of an existing one.
    pub async fn upsert(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        Profile::insert(model)
            .on_conflict(
                OnConflict::column(profile::Column::UserId)
                    .update_columns([
                        profile::Column::FullName,
                        profile::Column::PhoneNumber,
                        profile::Column::Organization,
                        profile::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete the profile of a user. Returns whether a row was removed.
    pub async fn delete_by_user_id(&self, user_id: Uuid) -> AppResult<bool> {
        let result = Profile::delete_many()
            .filter(profile::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}
