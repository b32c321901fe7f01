use axum::extract::State;
use serde::Deserialize;

use crate::api::validate::normalize;
use crate::api::{FieldErrors, JsonBody};
use crate::database::models::{ProfileChanges, User};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

const NAME_MAX: usize = 100;
const PHONE_MAX: usize = 30;

/// Only these fields are writable; anything else (role, email, isActive) is rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub nationality: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(self) -> Result<ProfileChanges, crate::error::ApiError> {
        let mut errors = FieldErrors::new();
        errors.optional_text("firstName", self.first_name.as_deref(), NAME_MAX);
        errors.optional_text("lastName", self.last_name.as_deref(), NAME_MAX);
        errors.optional_text("nationality", self.nationality.as_deref(), NAME_MAX);
        if let Some(phone) = self.phone.as_deref() {
            if !is_phone(phone) {
                errors.add("phone", "Must contain only digits, spaces and + - ( )");
            } else if phone.len() > PHONE_MAX {
                errors.add("phone", format!("Must be at most {} characters", PHONE_MAX));
            }
        }
        errors.into_result()?;

        Ok(ProfileChanges {
            first_name: normalize(self.first_name),
            last_name: normalize(self.last_name),
            phone: normalize(self.phone),
            nationality: normalize(self.nationality),
        })
    }
}

fn is_phone(value: &str) -> bool {
    let value = value.trim();
    value.chars().filter(char::is_ascii_digit).count() >= 5
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
}

/// PATCH /api/profile - partial update; absent fields keep their stored values
pub async fn patch(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<UpdateProfileRequest>,
) -> ApiResult<User> {
    let changes = body.validate()?;
    let updated = state.profiles().update(&user, changes).await?;
    Ok(ApiResponse::success(updated).with_message("Profile updated successfully"))
}
