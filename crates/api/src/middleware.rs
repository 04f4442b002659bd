//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use cybersecure_common::{
    AppError, StorageBackend,
    config::{ServerConfig, UploadConfig},
};
use cybersecure_core::{
    AdminService, AssistantService, AuthService, ChatService, EvidenceService,
    IdentityProviderService, ProfileService, ReportEvents, ReportService,
};
use cybersecure_db::repositories::{
    ChatHistoryRepository, GrievanceReportRepository, ProfileRepository,
    SuspiciousEntityRepository, UserRoleRepository,
};
use sea_orm::DatabaseConnection;

/// Name and port reported by `/health`.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub name: String,
    pub port: u16,
}

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub report_service: ReportService,
    pub evidence_service: EvidenceService,
    pub chat_service: ChatService,
    pub admin_service: AdminService,
    pub service_info: ServiceInfo,
}

impl AppState {
    /// Wire repositories and services over one database connection.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        identity: IdentityProviderService,
        storage: Arc<dyn StorageBackend>,
        assistant: AssistantService,
        server: &ServerConfig,
        upload: UploadConfig,
    ) -> Self {
        let profile_repo = ProfileRepository::new(Arc::clone(&db));
        let role_repo = UserRoleRepository::new(Arc::clone(&db));
        let grievance_repo = GrievanceReportRepository::new(Arc::clone(&db));
        let suspicious_repo = SuspiciousEntityRepository::new(Arc::clone(&db));
        let chat_repo = ChatHistoryRepository::new(db);

        let report_service = ReportService::new(
            grievance_repo,
            suspicious_repo,
            profile_repo.clone(),
            ReportEvents::new(),
        );

        Self {
            auth_service: AuthService::new(identity, role_repo.clone(), profile_repo.clone()),
            profile_service: ProfileService::new(profile_repo.clone()),
            evidence_service: EvidenceService::new(storage, upload),
            chat_service: ChatService::new(assistant, chat_repo),
            admin_service: AdminService::new(report_service.clone(), profile_repo, role_repo),
            report_service,
            service_info: ServiceInfo {
                name: server.service_name.clone(),
                port: server.port,
            },
        }
    }
}

/// Authentication middleware for protected routes.
///
/// Validates the bearer token with the identity provider and stores the
/// resolved user in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string);

    let Some(token) = token else {
        return AppError::Unauthorized("Missing or invalid authorization header".to_string())
            .into_response();
    };

    match state.auth_service.authenticate(&token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            req.extensions_mut().insert(AccessToken(token));
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// The raw bearer token of an authenticated request.
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);
