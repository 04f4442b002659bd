//! Authentication endpoints.
//!
//! Thin wrappers over the identity provider. Provider rejections come back
//! as 400 with the provider's message.

use axum::{Json, Router, extract::State, routing::post};
use cybersecure_common::AppResult;
use cybersecure_core::{SendOtpInput, SignInInput, SignUpInput, VerifyOtpInput};

use crate::{
    extractors::{ApiJson, BearerToken},
    middleware::AppState,
    response::{MessageResponse, SessionResponse, message},
};

/// Register with email and password.
async fn signup(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SignUpInput>,
) -> AppResult<Json<SessionResponse>> {
    let session = state.auth_service.sign_up(input).await?;
    Ok(SessionResponse::new(
        "User created successfully. Please check your email for verification.",
        session,
    ))
}

/// Sign in with email and password.
async fn signin(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SignInInput>,
) -> AppResult<Json<SessionResponse>> {
    let session = state.auth_service.sign_in(input).await?;
    Ok(SessionResponse::new("Sign in successful", session))
}

/// Email a one-time code.
async fn send_otp(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SendOtpInput>,
) -> AppResult<Json<MessageResponse>> {
    state.auth_service.send_otp(input).await?;
    Ok(message("OTP sent successfully. Please check your email."))
}

/// Exchange a one-time code for a session.
async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<VerifyOtpInput>,
) -> AppResult<Json<SessionResponse>> {
    let session = state.auth_service.verify_otp(input).await?;
    Ok(SessionResponse::new("OTP verified successfully", session))
}

/// Revoke the caller's session.
async fn signout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> AppResult<Json<MessageResponse>> {
    state.auth_service.sign_out(&token).await?;
    Ok(message("Signed out successfully"))
}

/// Routes that need no token.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/send-otp", post(send_otp))
        .route("/auth/verify-otp", post(verify_otp))
}

/// Routes behind the auth middleware.
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/auth/signout", post(signout))
}
