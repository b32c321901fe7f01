use serde_json::json;
use std::sync::Arc;

use crate::database::models::{ProfileChanges, User};
use crate::database::Repository;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::audit::record_best_effort;

pub struct ProfileService {
    repo: Arc<dyn Repository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, user: &AuthUser) -> Result<User, ApiError> {
        self.repo
            .get_user(user.id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    /// Apply only the supplied fields; everything else keeps its stored value
    pub async fn update(&self, user: &AuthUser, changes: ProfileChanges) -> Result<User, ApiError> {
        if changes.is_empty() {
            return Err(ApiError::validation_error("No profile fields provided", None));
        }

        let updated = self.repo.update_profile(user.id, &changes).await?;
        tracing::info!(user_id = %user.id, fields = ?changes.field_names(), "Profile updated");

        record_best_effort(
            self.repo.as_ref(),
            user.id,
            "user.profile.update",
            "user",
            user.id,
            json!({ "fields": changes.field_names() }),
        )
        .await;

        Ok(updated)
    }
}
