//! AI assistant endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use cybersecure_common::AppResult;
use cybersecure_core::ChatInput;
use cybersecure_db::entities::ai_chat_history;
use serde::Serialize;

use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
};

/// `{response}` response.
#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// `{history}` response.
#[derive(Serialize)]
pub struct HistoryResponse {
    pub history: Vec<ai_chat_history::Model>,
}

async fn chat(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ChatInput>,
) -> AppResult<Json<ChatResponse>> {
    let response = state.chat_service.ask(user.id, input).await?;
    Ok(Json(ChatResponse { response }))
}

async fn history(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<HistoryResponse>> {
    let history = state.chat_service.history(user.id).await?;
    Ok(Json(HistoryResponse { history }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/history", get(history))
}
