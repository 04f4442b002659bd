//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::request::Parts,
};
use cybersecure_common::AppError;
use cybersecure_core::IdentityUser;
use serde::de::DeserializeOwned;

use crate::middleware::{AccessToken, AppState};

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub IdentityUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware
        parts
            .extensions
            .get::<IdentityUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                AppError::Unauthorized("Missing or invalid authorization header".to_string())
            })
    }
}

/// Bearer token of the authenticated request.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AccessToken>()
            .map(|t| Self(t.0.clone()))
            .ok_or_else(|| {
                AppError::Unauthorized("Missing or invalid authorization header".to_string())
            })
    }
}

/// Authenticated user holding the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub IdentityUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        state.auth_service.require_admin(user.id).await?;
        Ok(Self(user))
    }
}

/// JSON body whose rejections render as API errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(&rejection)),
        }
    }
}

fn json_rejection(rejection: &JsonRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}
