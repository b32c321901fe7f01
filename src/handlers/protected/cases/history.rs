use axum::extract::{Path, State};

use crate::api::parse_id;
use crate::database::models::HistoryEntry;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/cases/:id/history - newest first, with `changedByUser`
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<HistoryEntry>> {
    let case_id = parse_id(&id, "id")?;
    let history = state.cases().history(&user, case_id).await?;
    Ok(ApiResponse::success(history))
}
