//! AI chat relay.

use chrono::Utc;
use cybersecure_common::{AppError, AppResult, IdGenerator};
use cybersecure_db::{entities::ai_chat_history, repositories::ChatHistoryRepository};
use sea_orm::Set;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::assistant::AssistantService;

/// Maximum number of history entries returned.
pub const HISTORY_LIMIT: u64 = 50;

/// A question for the assistant.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ChatInput {
    #[validate(length(max = 8000))]
    pub message: Option<String>,
}

/// Chat service.
#[derive(Clone)]
pub struct ChatService {
    assistant: AssistantService,
    history_repo: ChatHistoryRepository,
    id_gen: IdGenerator,
}

impl ChatService {
    /// Create a new chat service.
    #[must_use]
    pub const fn new(assistant: AssistantService, history_repo: ChatHistoryRepository) -> Self {
        Self {
            assistant,
            history_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Ask the assistant and record the exchange.
    ///
    /// Nothing is recorded when the assistant fails. A failed history write
    /// is logged and the answer is still returned.
    pub async fn ask(&self, user_id: Uuid, input: ChatInput) -> AppResult<String> {
        input.validate()?;
        let message = input
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| AppError::BadRequest("Message is required".to_string()))?;

        let answer = self.assistant.ask(message).await?;
        let answer = answer.trim().to_string();

        let entry = ai_chat_history::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id),
            question: Set(message.to_string()),
            response: Set(answer.clone()),
            created_at: Set(Utc::now().into()),
        };
        if let Err(e) = self.history_repo.create(entry).await {
            tracing::error!(user_id = %user_id, error = %e, "Failed to save chat history");
        }

        tracing::debug!(user_id = %user_id, "Assistant answered");
        Ok(answer)
    }

    /// The caller's most recent exchanges, newest first.
    pub async fn history(&self, user_id: Uuid) -> AppResult<Vec<ai_chat_history::Model>> {
        self.history_repo.find_by_user(user_id, HISTORY_LIMIT).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::assistant::{ASSISTANT_FAILED, Assistant};
    use async_trait::async_trait;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use std::sync::Arc;

    struct StubAssistant(Result<&'static str, &'static str>);

    #[async_trait]
    impl Assistant for StubAssistant {
        async fn ask(&self, _question: &str) -> AppResult<String> {
            self.0.map(ToString::to_string).map_err(|details| AppError::Assistant {
                message: ASSISTANT_FAILED.to_string(),
                details: details.to_string(),
            })
        }
    }

    fn entry(user_id: Uuid) -> ai_chat_history::Model {
        ai_chat_history::Model {
            id: Uuid::new_v4(),
            user_id,
            question: "What is vishing?".to_string(),
            response: "Voice phishing.".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn ask(message: &str) -> ChatInput {
        ChatInput {
            message: Some(message.to_string()),
        }
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = ChatService::new(
            Arc::new(StubAssistant(Ok("unused"))),
            ChatHistoryRepository::new(db),
        );

        for input in [ChatInput::default(), ask("   ")] {
            let err = svc.ask(Uuid::new_v4(), input).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest(msg) if msg == "Message is required"));
        }
    }

    #[tokio::test]
    async fn test_success_writes_one_history_row() {
        let user_id = Uuid::new_v4();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[entry(user_id)]])
                .into_connection(),
        );
        let svc = ChatService::new(
            Arc::new(StubAssistant(Ok("  Voice phishing.\n"))),
            ChatHistoryRepository::new(db.clone()),
        );

        let answer = svc.ask(user_id, ask("What is vishing?")).await.unwrap();
        assert_eq!(answer, "Voice phishing.");

        drop(svc);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_writes_nothing() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = ChatService::new(
            Arc::new(StubAssistant(Err("python: No module named torch"))),
            ChatHistoryRepository::new(db.clone()),
        );

        let err = svc.ask(Uuid::new_v4(), ask("hi")).await.unwrap_err();
        assert!(
            matches!(err, AppError::Assistant { details, .. } if details == "python: No module named torch")
        );

        drop(svc);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_history_write_failure_still_answers() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("disk full".to_string())])
                .into_connection(),
        );
        let svc = ChatService::new(
            Arc::new(StubAssistant(Ok("Use a password manager."))),
            ChatHistoryRepository::new(db),
        );

        let answer = svc.ask(Uuid::new_v4(), ask("passwords?")).await.unwrap();
        assert_eq!(answer, "Use a password manager.");
    }

    #[tokio::test]
    async fn test_history_returns_rows() {
        let user_id = Uuid::new_v4();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[entry(user_id), entry(user_id)]])
                .into_connection(),
        );
        let svc = ChatService::new(Arc::new(StubAssistant(Ok("x"))), ChatHistoryRepository::new(db));

        assert_eq!(svc.history(user_id).await.unwrap().len(), 2);
    }
}
