//! AI chat history repository.

use std::sync::Arc;

use crate::entities::{AiChatHistory, ai_chat_history};
use cybersecure_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

/// Chat history repository for database operations.
#[derive(Clone)]
pub struct ChatHistoryRepository {
    db: Arc<DatabaseConnection>,
}

impl ChatHistoryRepository {
    /// Create a new chat history repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append an answered question.
    pub async fn create(
        &self,
        model: ai_chat_history::ActiveModel,
    ) -> AppResult<ai_chat_history::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recent entries of a user, newest first.
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> AppResult<Vec<ai_chat_history::Model>> {
        AiChatHistory::find()
            .filter(ai_chat_history::Column::UserId.eq(user_id))
            .order_by_desc(ai_chat_history::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
