use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::types::Role;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub user: User,
}

/// GET /api/auth/me - the authenticated identity and its user record
pub async fn get(State(state): State<AppState>, user: AuthUser) -> ApiResult<Me> {
    let record = state.profiles().get(&user).await?;
    Ok(ApiResponse::success(Me {
        id: user.id,
        email: user.email,
        role: user.role,
        user: record,
    }))
}
