//! HTTP API layer for the CyberSecure Portal gateway.
//!
//! This crate provides the REST API and the live report feed:
//!
//! - **Endpoints**: auth, profiles, reports, uploads, AI chat, admin
//! - **Extractors**: bearer-token user, admin gate, JSON bodies
//! - **Middleware**: token validation, CORS, security headers, tracing
//! - **Streaming**: Server-Sent Events for report lists
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod sse;

use axum::{
    Router,
    http::{
        HeaderName, HeaderValue, Method,
        header::{
            AUTHORIZATION, CONTENT_TYPE, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
};
use cybersecure_common::{AppError, AppResult};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

pub use endpoints::router;
pub use middleware::AppState;

/// Unknown route.
async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}

/// CORS for the single configured client origin.
pub fn cors_layer(origin: &str) -> AppResult<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| AppError::Config(format!("Invalid CORS origin {origin}: {e}")))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]))
}

/// Build the complete application.
pub fn app(state: AppState, cors_origin: &str) -> AppResult<Router> {
    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin)?)
        .layer(CompressionLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    Ok(Router::new()
        .merge(endpoints::meta::router())
        .nest("/api", router(&state))
        .fallback(not_found)
        .layer(layers)
        .with_state(state))
}
