//! Service banner and health check.

use axum::{Json, Router, extract::State, routing::get};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::middleware::AppState;

/// Route groups listed by the banner.
#[derive(Serialize)]
pub struct EndpointMap {
    pub auth: &'static str,
    pub profiles: &'static str,
    pub reports: &'static str,
    pub ai: &'static str,
    pub upload: &'static str,
    pub admin: &'static str,
}

/// Service banner.
#[derive(Serialize)]
pub struct BannerResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub endpoints: EndpointMap,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub service: String,
    pub port: u16,
}

async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "CyberSecure Portal Backend API",
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: EndpointMap {
            auth: "/api/auth/*",
            profiles: "/api/profiles/*",
            reports: "/api/reports/*",
            ai: "/api/ai/*",
            upload: "/api/upload",
            admin: "/api/admin/*",
        },
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        service: state.service_info.name.clone(),
        port: state.service_info.port,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
}
