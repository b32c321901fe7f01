use axum::extract::State;

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/profile
pub async fn get(State(state): State<AppState>, user: AuthUser) -> ApiResult<User> {
    let profile = state.profiles().get(&user).await?;
    Ok(ApiResponse::success(profile))
}
