use axum::extract::{Query, State};
use serde::Deserialize;

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    pub role: Option<String>,
}

/// GET /api/admin/users[?role=]
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UsersQuery>,
) -> ApiResult<Vec<User>> {
    user.require_role(&[Role::Admin], "list users")?;

    let role = query
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(|e| ApiError::invalid_field("role", e))?;

    let users = state.repo.list_users(role).await?;
    Ok(ApiResponse::success(users))
}
