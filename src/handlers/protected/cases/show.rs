use axum::extract::{Path, State};

use crate::api::parse_id;
use crate::database::models::Case;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/cases/:id
pub async fn get(State(state): State<AppState>, user: AuthUser, Path(id): Path<String>) -> ApiResult<Case> {
    let case_id = parse_id(&id, "id")?;
    let case = state.cases().get_readable(&user, case_id).await?;
    Ok(ApiResponse::success(case))
}
