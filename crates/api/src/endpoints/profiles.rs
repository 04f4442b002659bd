//! Profile endpoints.

use axum::{Json, Router, extract::State, routing::get};
use cybersecure_common::AppResult;
use cybersecure_core::UpdateProfileInput;
use cybersecure_db::entities::profile;
use serde::Serialize;

use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
};

/// `{profile}` response. `null` until the caller has saved one.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub profile: Option<profile::Model>,
}

/// The caller's profile.
async fn get_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.profile_service.get(user.id).await?;
    Ok(Json(ProfileResponse { profile }))
}

/// Create or replace the caller's profile.
async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<UpdateProfileInput>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.profile_service.update(user.id, input).await?;
    Ok(Json(ProfileResponse {
        profile: Some(profile),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(get_me).put(update_me))
}
