//! API endpoints.

mod admin;
mod ai;
mod auth;
pub mod meta;
mod profiles;
mod reports;
mod upload;

use axum::{Router, middleware};
use cybersecure_common::{AppError, AppResult};
use uuid::Uuid;

use crate::middleware::{AppState, require_auth};

/// Create the `/api` router.
///
/// Everything except the sign-up, sign-in and OTP routes sits behind the
/// bearer-token middleware.
pub fn router(state: &AppState) -> Router<AppState> {
    let limits = state.evidence_service.limits();

    let protected = Router::new()
        .merge(auth::protected_router())
        .nest("/profiles", profiles::router())
        .nest("/reports", reports::router(limits))
        .merge(upload::router(limits))
        .nest("/ai", ai::router())
        .nest("/admin", admin::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(auth::public_router())
        .merge(protected)
}

/// Parse a UUID path segment.
pub(crate) fn parse_uuid(value: &str, what: &str) -> AppResult<Uuid> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {what}: {value}")))
}
