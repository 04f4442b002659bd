//! Admin endpoints.
//!
//! Every handler takes [`AdminUser`], which rejects non-admins with 403.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, patch, post},
};
use cybersecure_common::AppResult;
use cybersecure_core::{
    AdminReport, AdminStats, ReportKind, UnifiedReport, UpdateReportInput, UserSummary,
};
use serde::Serialize;

use super::parse_uuid;
use crate::{
    extractors::{AdminUser, ApiJson},
    middleware::AppState,
    response::{MessageResponse, message},
    sse,
};

/// `{reports}` response.
#[derive(Serialize)]
pub struct AdminReportsResponse {
    pub reports: Vec<AdminReport>,
}

/// `{report}` response.
#[derive(Serialize)]
pub struct ReviewedReportResponse {
    pub report: UnifiedReport,
}

/// `{users}` response.
#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserSummary>,
}

/// `{stats}` response.
#[derive(Serialize)]
pub struct StatsResponse {
    pub stats: AdminStats,
}

async fn list_reports(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<Json<AdminReportsResponse>> {
    let reports = state.admin_service.list_reports().await?;
    Ok(Json(AdminReportsResponse { reports }))
}

async fn update_report(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    ApiJson(input): ApiJson<UpdateReportInput>,
) -> AppResult<Json<ReviewedReportResponse>> {
    let kind: ReportKind = kind.parse()?;
    let id = parse_uuid(&id, "report id")?;

    let report = state.admin_service.update_report(kind, id, input).await?;
    tracing::info!(admin_id = %admin.id, report_id = %id, kind = %kind, "Report updated by admin");
    Ok(Json(ReviewedReportResponse { report }))
}

async fn list_users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<Json<UsersResponse>> {
    let users = state.admin_service.list_users().await?;
    Ok(Json(UsersResponse { users }))
}

async fn delete_user(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = parse_uuid(&user_id, "user id")?;
    state.admin_service.delete_user_profile(user_id).await?;
    Ok(message("User profile deleted successfully"))
}

async fn grant_admin(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = parse_uuid(&user_id, "user id")?;
    state.admin_service.grant_admin(user_id).await?;
    Ok(message("Admin role granted"))
}

async fn stats(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<Json<StatsResponse>> {
    let stats = state.admin_service.stats().await?;
    Ok(Json(StatsResponse { stats }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports))
        .route("/reports/stream", get(sse::admin_reports))
        .route("/reports/{kind}/{id}", patch(update_report))
        .route("/users", get(list_users))
        .route("/users/{user_id}", delete(delete_user))
        .route("/users/{user_id}/admin", post(grant_admin))
        .route("/stats", get(stats))
}
