//! User role repository.

use std::sync::Arc;

use crate::entities::{AppRole, UserRole, user_role};
use cybersecure_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
    sea_query::OnConflict,
};
use uuid::Uuid;

/// User role repository for database operations.
#[derive(Clone)]
pub struct UserRoleRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRoleRepository {
    /// Create a new user role repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check whether a user holds a role.
    pub async fn has_role(&self, user_id: Uuid, role: AppRole) -> AppResult<bool> {
        let count = UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::Role.eq(role))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// IDs of every user holding a role.
    pub async fn find_user_ids_with_role(&self, role: AppRole) -> AppResult<Vec<Uuid>> {
        UserRole::find()
            .select_only()
            .column(user_role::Column::UserId)
            .filter(user_role::Column::Role.eq(role))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Grant a role. Granting a role the user already has is a no-op.
    pub async fn grant(&self, model: user_role::ActiveModel) -> AppResult<()> {
        UserRole::insert(model)
            .on_conflict(
                OnConflict::columns([user_role::Column::UserId, user_role::Column::Role])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
