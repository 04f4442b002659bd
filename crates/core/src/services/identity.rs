//! Hosted identity provider.
//!
//! The gateway never verifies tokens locally. Every bearer token is checked
//! against the provider's `/user` endpoint.

use async_trait::async_trait;
use cybersecure_common::{AppError, AppResult, config::IdentityConfig};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

/// A user as reported by the identity provider.
#[derive(Debug, Clone)]
pub struct IdentityUser {
    pub id: Uuid,
    pub email: Option<String>,
    /// The provider's full user object, passed through to clients.
    pub raw: Value,
}

impl IdentityUser {
    /// Build from a provider user object. Returns `None` when it carries no usable ID.
    #[must_use]
    pub fn from_value(raw: Value) -> Option<Self> {
        let id = raw.get("id")?.as_str()?.parse().ok()?;
        let email = raw
            .get("email")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        Some(Self { id, email, raw })
    }
}

/// Result of a sign-up or sign-in call.
///
/// `session` is absent when the provider requires email confirmation first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthSession {
    pub user: Option<Value>,
    pub session: Option<Value>,
}

impl AuthSession {
    /// ID of the user in this result, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<Uuid> {
        self.user
            .as_ref()
            .and_then(|u| u.get("id"))
            .and_then(Value::as_str)
            .and_then(|id| id.parse().ok())
    }
}

/// Sign-up request forwarded to the provider.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub organization: Option<String>,
}

/// Operations the gateway needs from the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account.
    async fn sign_up(&self, request: &SignUpRequest) -> AppResult<AuthSession>;

    /// Password sign-in.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession>;

    /// Email a one-time passcode.
    async fn send_otp(&self, email: &str) -> AppResult<()>;

    /// Exchange an emailed passcode for a session.
    async fn verify_otp(&self, email: &str, token: &str) -> AppResult<AuthSession>;

    /// Revoke the session behind a token.
    async fn sign_out(&self, access_token: &str) -> AppResult<()>;

    /// Resolve a bearer token. `Ok(None)` means the provider rejected it.
    async fn get_user(&self, access_token: &str) -> AppResult<Option<IdentityUser>>;
}

/// Shared identity provider handle.
pub type IdentityProviderService = Arc<dyn IdentityProvider>;

/// REST client for a GoTrue-compatible auth server (`{url}/auth/v1`).
#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base: String,
    anon_key: String,
    redirect_url: Option<String>,
}

impl GoTrueClient {
    /// Create a client from the identity configuration.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &IdentityConfig) -> Self {
        Self {
            http,
            base: format!("{}/auth/v1", config.url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
            redirect_url: config.redirect_url.clone(),
        }
    }

    fn endpoint(&self, path: &str, redirect: bool) -> AppResult<Url> {
        let mut url = Url::parse(&format!("{}/{path}", self.base))
            .map_err(|e| AppError::Config(format!("Invalid identity URL: {e}")))?;
        if let Some(to) = self.redirect_url.as_ref().filter(|_| redirect) {
            url.query_pairs_mut().append_pair("redirect_to", to);
        }
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
    }

    async fn post_json(&self, url: Url, body: Value) -> AppResult<Value> {
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(format!("Request failed: {e}")))?;

        read_body(response).await
    }
}

/// Turn a provider response into JSON, mapping rejections to errors.
///
/// Client errors carry the provider's own message and surface as 400.
async fn read_body(response: reqwest::Response) -> AppResult<Value> {
    let status = response.status();
    let body: Value = if status == StatusCode::NO_CONTENT {
        Value::Null
    } else {
        response
            .json()
            .await
            .map_err(|e| AppError::IdentityProvider(format!("Invalid response: {e}")))?
    };

    if status.is_success() {
        Ok(body)
    } else if status.is_client_error() {
        Err(AppError::BadRequest(provider_message(&body)))
    } else {
        Err(AppError::IdentityProvider(format!(
            "Provider returned {status}: {}",
            provider_message(&body)
        )))
    }
}

/// Pick the human-readable message out of a provider error body.
fn provider_message(body: &Value) -> String {
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .unwrap_or("Authentication request failed")
        .to_string()
}

/// Split a provider response into user and session parts.
///
/// Session responses carry `access_token` with the user nested inside.
/// Unconfirmed sign-ups return the bare user object.
fn split_session(body: Value) -> AuthSession {
    if body.get("access_token").is_some() {
        AuthSession {
            user: body.get("user").cloned(),
            session: Some(body),
        }
    } else if body.get("id").is_some() {
        AuthSession {
            user: Some(body),
            session: None,
        }
    } else {
        AuthSession::default()
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn sign_up(&self, request: &SignUpRequest) -> AppResult<AuthSession> {
        let body = json!({
            "email": request.email,
            "password": request.password,
            "data": {
                "full_name": request.full_name,
                "phone_number": request.phone_number,
                "organization": request.organization,
            },
        });
        let value = self.post_json(self.endpoint("signup", true)?, body).await?;
        Ok(split_session(value))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let mut url = self.endpoint("token", false)?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let value = self
            .post_json(url, json!({ "email": email, "password": password }))
            .await?;
        Ok(split_session(value))
    }

    async fn send_otp(&self, email: &str) -> AppResult<()> {
        self.post_json(
            self.endpoint("otp", true)?,
            json!({ "email": email, "create_user": true }),
        )
        .await?;
        Ok(())
    }

    async fn verify_otp(&self, email: &str, token: &str) -> AppResult<AuthSession> {
        let value = self
            .post_json(
                self.endpoint("verify", false)?,
                json!({ "type": "email", "email": email, "token": token }),
            )
            .await?;
        Ok(split_session(value))
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let response = self
            .request(reqwest::Method::POST, self.endpoint("logout", false)?)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(format!("Request failed: {e}")))?;

        read_body(response).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> AppResult<Option<IdentityUser>> {
        let response = self
            .request(reqwest::Method::GET, self.endpoint("user", false)?)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(format!("Request failed: {e}")))?;

        if response.status().is_client_error() {
            return Ok(None);
        }

        let body = read_body(response).await?;
        Ok(IdentityUser::from_value(body))
    }
}
