//! Report endpoints.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{get, post},
};
use cybersecure_common::{AppResult, config::UploadConfig};
use cybersecure_core::{CreateGrievanceInput, CreateSuspiciousInput, ReportKind, UnifiedReport};
use cybersecure_db::entities::{grievance_report, suspicious_entity};
use serde::Serialize;

use super::{parse_uuid, upload::read_files};
use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::StoredFile,
    sse,
};

/// `{reports}` response.
#[derive(Serialize)]
pub struct ReportsResponse<T: Serialize> {
    pub reports: Vec<T>,
}

/// `{report}` response.
#[derive(Serialize)]
pub struct ReportResponse<T: Serialize> {
    pub report: T,
}

/// `{report, files}` response.
#[derive(Serialize)]
pub struct EvidenceResponse {
    pub report: UnifiedReport,
    pub files: Vec<StoredFile>,
}

/// Both kinds of the caller's reports, newest first.
async fn list_mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ReportsResponse<UnifiedReport>>> {
    let reports = state.report_service.list_for_user(user.id).await?;
    Ok(Json(ReportsResponse { reports }))
}

async fn list_grievances(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ReportsResponse<grievance_report::Model>>> {
    let reports = state.report_service.list_grievances(user.id).await?;
    Ok(Json(ReportsResponse { reports }))
}

async fn create_grievance(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateGrievanceInput>,
) -> AppResult<Json<ReportResponse<grievance_report::Model>>> {
    let report = state.report_service.create_grievance(user.id, input).await?;
    Ok(Json(ReportResponse { report }))
}

async fn list_suspicious(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ReportsResponse<suspicious_entity::Model>>> {
    let reports = state.report_service.list_suspicious(user.id).await?;
    Ok(Json(ReportsResponse { reports }))
}

async fn create_suspicious(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateSuspiciousInput>,
) -> AppResult<Json<ReportResponse<suspicious_entity::Model>>> {
    let report = state.report_service.create_suspicious(user.id, input).await?;
    Ok(Json(ReportResponse { report }))
}

/// Attach evidence to one of the caller's reports.
async fn attach_evidence(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    mut multipart: Multipart,
) -> AppResult<Json<EvidenceResponse>> {
    let kind: ReportKind = kind.parse()?;
    let id = parse_uuid(&id, "report id")?;

    let files = read_files(&mut multipart, state.evidence_service.limits()).await?;
    let (report, uploaded) = state
        .evidence_service
        .attach_to_report(&state.report_service, user.id, kind, id, &files)
        .await?;

    Ok(Json(EvidenceResponse {
        report,
        files: uploaded.into_iter().map(StoredFile::from).collect(),
    }))
}

pub fn router(limits: UploadConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(list_mine))
        .route("/stream", get(sse::user_reports))
        .route("/grievance", get(list_grievances).post(create_grievance))
        .route("/suspicious", get(list_suspicious).post(create_suspicious))
        .route(
            "/{kind}/{id}/evidence",
            post(attach_evidence).layer(DefaultBodyLimit::max(limits.body_limit())),
        )
}
