//! Authentication service.
//!
//! Credentials, OTPs and tokens are handled by the identity provider. This
//! service validates input, keeps the profile table in step with sign-ups
//! and answers the admin question from `user_roles`.

use cybersecure_common::{AppError, AppResult, IdGenerator};
use cybersecure_db::{
    entities::AppRole,
    repositories::{ProfileRepository, UserRoleRepository},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{
    identity::{AuthSession, IdentityProviderService, IdentityUser, SignUpRequest},
    profile::profile_upsert,
};

/// Sign-up form. The web client sends camelCase keys.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpInput {
    #[validate(length(max = 320))]
    pub email: Option<String>,
    #[validate(length(max = 256))]
    pub password: Option<String>,
    #[serde(alias = "full_name")]
    #[validate(length(max = 256))]
    pub full_name: Option<String>,
    #[serde(alias = "phone_number")]
    #[validate(length(max = 32))]
    pub phone_number: Option<String>,
    #[validate(length(max = 256))]
    pub organization: Option<String>,
}

/// Password sign-in form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request for a one-time code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendOtpInput {
    pub email: Option<String>,
}

/// One-time code verification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyOtpInput {
    pub email: Option<String>,
    pub token: Option<String>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    identity: IdentityProviderService,
    role_repo: UserRoleRepository,
    profile_repo: ProfileRepository,
    id_gen: IdGenerator,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        identity: IdentityProviderService,
        role_repo: UserRoleRepository,
        profile_repo: ProfileRepository,
    ) -> Self {
        Self {
            identity,
            role_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a user and seed their profile from the sign-up form.
    ///
    /// A failed profile write does not fail the sign-up.
    pub async fn sign_up(&self, input: SignUpInput) -> AppResult<AuthSession> {
        input.validate()?;

        let (Some(email), Some(password), Some(full_name)) = (
            present(input.email.as_ref()),
            input.password.as_deref().filter(|p| !p.is_empty()),
            present(input.full_name.as_ref()),
        ) else {
            return Err(AppError::BadRequest(
                "Email, password, and full name are required".to_string(),
            ));
        };

        let request = SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            full_name: full_name.to_string(),
            phone_number: input.phone_number.clone(),
            organization: input.organization.clone(),
        };
        let session = self.identity.sign_up(&request).await?;

        match session.user_id() {
            Some(user_id) => {
                let model = profile_upsert(
                    &self.id_gen,
                    user_id,
                    request.full_name,
                    request.phone_number,
                    request.organization,
                );
                if let Err(e) = self.profile_repo.upsert(model).await {
                    tracing::warn!(user_id = %user_id, error = %e, "Failed to create profile on sign-up");
                }
                tracing::info!(user_id = %user_id, "User signed up");
            }
            None => tracing::warn!("Sign-up response carried no user id"),
        }

        Ok(session)
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, input: SignInInput) -> AppResult<AuthSession> {
        let (Some(email), Some(password)) = (
            present(input.email.as_ref()),
            input.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::BadRequest(
                "Email and password are required".to_string(),
            ));
        };

        let session = self.identity.sign_in_with_password(email, password).await?;
        if let Some(user_id) = session.user_id() {
            tracing::info!(user_id = %user_id, "User signed in");
        }
        Ok(session)
    }

    /// Email a one-time code, creating the account if needed.
    pub async fn send_otp(&self, input: SendOtpInput) -> AppResult<()> {
        let email = present(input.email.as_ref())
            .ok_or_else(|| AppError::BadRequest("Email is required".to_string()))?;
        self.identity.send_otp(email).await
    }

    /// Exchange a one-time code for a session.
    pub async fn verify_otp(&self, input: VerifyOtpInput) -> AppResult<AuthSession> {
        let (Some(email), Some(token)) = (
            present(input.email.as_ref()),
            present(input.token.as_ref()),
        ) else {
            return Err(AppError::BadRequest(
                "Email and OTP token are required".to_string(),
            ));
        };
        self.identity.verify_otp(email, token).await
    }

    /// Revoke the session behind an access token.
    pub async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        self.identity.sign_out(access_token).await
    }

    /// Resolve a bearer token to its user.
    ///
    /// Every failure, including an unreachable provider, is a 401.
    pub async fn authenticate(&self, access_token: &str) -> AppResult<IdentityUser> {
        match self.identity.get_user(access_token).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(AppError::Unauthorized("Invalid token".to_string())),
            Err(e) => {
                tracing::warn!(error = %e, "Token validation failed");
                Err(AppError::Unauthorized("Invalid token".to_string()))
            }
        }
    }

    /// Whether a user holds the admin role.
    pub async fn is_admin(&self, user_id: Uuid) -> AppResult<bool> {
        self.role_repo.has_role(user_id, AppRole::Admin).await
    }

    /// Fail with 403 unless the user is an admin.
    pub async fn require_admin(&self, user_id: Uuid) -> AppResult<()> {
        if self.is_admin(user_id).await? {
            Ok(())
        } else {
            tracing::debug!(user_id = %user_id, "Admin access denied");
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::identity::IdentityProvider;
    use async_trait::async_trait;
    use chrono::Utc;
    use cybersecure_db::entities::profile;
    use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Identity provider double that accepts one token.
    struct FakeIdentity {
        user_id: Uuid,
        signups: Mutex<Vec<String>>,
    }

    impl FakeIdentity {
        fn new(user_id: Uuid) -> Self {
            Self {
                user_id,
                signups: Mutex::new(Vec::new()),
            }
        }

        fn session(&self) -> AuthSession {
            AuthSession {
                user: Some(json!({"id": self.user_id, "email": "user@example.com"})),
                session: Some(json!({"access_token": "good"})),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        async fn sign_up(&self, request: &SignUpRequest) -> AppResult<AuthSession> {
            self.signups.lock().unwrap().push(request.email.clone());
            Ok(self.session())
        }

        async fn sign_in_with_password(&self, _email: &str, password: &str) -> AppResult<AuthSession> {
            if password == "right" {
                Ok(self.session())
            } else {
                Err(AppError::BadRequest("Invalid login credentials".to_string()))
            }
        }

        async fn send_otp(&self, _email: &str) -> AppResult<()> {
            Ok(())
        }

        async fn verify_otp(&self, _email: &str, token: &str) -> AppResult<AuthSession> {
            if token == "123456" {
                Ok(self.session())
            } else {
                Err(AppError::BadRequest("Token has expired or is invalid".to_string()))
            }
        }

        async fn sign_out(&self, _access_token: &str) -> AppResult<()> {
            Ok(())
        }

        async fn get_user(&self, access_token: &str) -> AppResult<Option<IdentityUser>> {
            match access_token {
                "good" => Ok(IdentityUser::from_value(json!({"id": self.user_id}))),
                "outage" => Err(AppError::IdentityProvider("connection refused".to_string())),
                _ => Ok(None),
            }
        }
    }

    fn service(identity: Arc<FakeIdentity>, db: DatabaseConnection) -> AuthService {
        let db = Arc::new(db);
        AuthService::new(
            identity,
            UserRoleRepository::new(db.clone()),
            ProfileRepository::new(db),
        )
    }

    fn empty_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    #[test]
    fn test_sign_up_input_reads_client_keys() {
        let input: SignUpInput = serde_json::from_value(json!({
            "email": "asha@example.com",
            "password": "pw123456",
            "fullName": "Asha Rao",
            "phoneNumber": "+91 90000 00000",
            "organization": "CERT",
        }))
        .unwrap();
        assert_eq!(input.full_name.as_deref(), Some("Asha Rao"));
        assert_eq!(input.phone_number.as_deref(), Some("+91 90000 00000"));

        let snake: SignUpInput =
            serde_json::from_value(json!({"full_name": "Asha Rao"})).unwrap();
        assert_eq!(snake.full_name.as_deref(), Some("Asha Rao"));
    }

    #[tokio::test]
    async fn test_sign_up_requires_fields() {
        let svc = service(Arc::new(FakeIdentity::new(Uuid::new_v4())), empty_db());
        let err = svc
            .sign_up(SignUpInput {
                email: Some("a@b.c".to_string()),
                password: Some("pw".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::BadRequest(msg) if msg == "Email, password, and full name are required")
        );
    }

    #[tokio::test]
    async fn test_sign_up_survives_profile_failure() {
        let user_id = Uuid::new_v4();
        let identity = Arc::new(FakeIdentity::new(user_id));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("profiles unavailable".to_string())])
            .into_connection();
        let svc = service(identity.clone(), db);

        let session = svc
            .sign_up(SignUpInput {
                email: Some("user@example.com".to_string()),
                password: Some("hunter22".to_string()),
                full_name: Some("Ravi Kumar".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(session.user_id(), Some(user_id));
        assert_eq!(identity.signups.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sign_up_writes_profile() {
        let user_id = Uuid::new_v4();
        let row = profile::Model {
            id: Uuid::new_v4(),
            user_id,
            full_name: "Ravi Kumar".to_string(),
            phone_number: Some("+91 98000 00000".to_string()),
            organization: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row]])
                .into_connection(),
        );
        let svc = AuthService::new(
            Arc::new(FakeIdentity::new(user_id)),
            UserRoleRepository::new(db.clone()),
            ProfileRepository::new(db.clone()),
        );

        svc.sign_up(SignUpInput {
            email: Some("user@example.com".to_string()),
            password: Some("hunter22".to_string()),
            full_name: Some("Ravi Kumar".to_string()),
            phone_number: Some("+91 98000 00000".to_string()),
            organization: None,
        })
        .await
        .unwrap();

        drop(svc);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_validation_and_provider_error() {
        let svc = service(Arc::new(FakeIdentity::new(Uuid::new_v4())), empty_db());

        let err = svc.sign_in(SignInInput::default()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Email and password are required"));

        let err = svc
            .sign_in(SignInInput {
                email: Some("user@example.com".to_string()),
                password: Some("wrong".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Invalid login credentials"));
    }

    #[tokio::test]
    async fn test_otp_validation() {
        let svc = service(Arc::new(FakeIdentity::new(Uuid::new_v4())), empty_db());

        let err = svc.send_otp(SendOtpInput::default()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Email is required"));

        let err = svc
            .verify_otp(VerifyOtpInput {
                email: Some("user@example.com".to_string()),
                token: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Email and OTP token are required"));

        let session = svc
            .verify_otp(VerifyOtpInput {
                email: Some("user@example.com".to_string()),
                token: Some("123456".to_string()),
            })
            .await
            .unwrap();
        assert!(session.session.is_some());
    }

    #[tokio::test]
    async fn test_authenticate() {
        let user_id = Uuid::new_v4();
        let svc = service(Arc::new(FakeIdentity::new(user_id)), empty_db());

        assert_eq!(svc.authenticate("good").await.unwrap().id, user_id);
        for token in ["bad", "outage"] {
            let err = svc.authenticate(token).await.unwrap_err();
            assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Invalid token"));
        }
    }

    #[tokio::test]
    async fn test_require_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(1)),
            }]])
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(0)),
            }]])
            .into_connection();
        let svc = service(Arc::new(FakeIdentity::new(Uuid::new_v4())), db);

        assert!(svc.require_admin(Uuid::new_v4()).await.is_ok());
        let err = svc.require_admin(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(msg) if msg == "Admin access required"));
    }
}
