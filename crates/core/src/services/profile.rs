//! Profile service.

use chrono::Utc;
use cybersecure_common::{AppError, AppResult, IdGenerator};
use cybersecure_db::{entities::profile, repositories::ProfileRepository};
use sea_orm::Set;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Input for updating the caller's profile.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(max = 256))]
    pub full_name: Option<String>,
    #[validate(length(max = 32))]
    pub phone_number: Option<String>,
    #[validate(length(max = 256))]
    pub organization: Option<String>,
}

/// Build the insert side of a profile upsert.
///
/// On conflict only the name, contact fields and `updated_at` are written,
/// so the generated `id` and `created_at` only matter for new rows.
pub(crate) fn profile_upsert(
    id_gen: &IdGenerator,
    user_id: Uuid,
    full_name: String,
    phone_number: Option<String>,
    organization: Option<String>,
) -> profile::ActiveModel {
    let now = Utc::now();
    profile::ActiveModel {
        id: Set(id_gen.generate()),
        user_id: Set(user_id),
        full_name: Set(full_name),
        phone_number: Set(non_blank(phone_number)),
        organization: Set(non_blank(organization)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Profile service.
#[derive(Clone)]
pub struct ProfileService {
    profile_repo: ProfileRepository,
    id_gen: IdGenerator,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(profile_repo: ProfileRepository) -> Self {
        Self {
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// The caller's profile, if one was created.
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<profile::Model>> {
        self.profile_repo.find_by_user_id(user_id).await
    }

    /// Create or replace the caller's profile.
    pub async fn update(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> AppResult<profile::Model> {
        input.validate()?;

        let full_name = non_blank(input.full_name)
            .ok_or_else(|| AppError::BadRequest("Full name is required".to_string()))?;

        let profile = self
            .profile_repo
            .upsert(profile_upsert(
                &self.id_gen,
                user_id,
                full_name,
                input.phone_number,
                input.organization,
            ))
            .await?;

        tracing::info!(user_id = %user_id, "Profile updated");
        Ok(profile)
    }
}
