use axum::extract::{Query, State};
use serde::Deserialize;

use crate::database::models::Case;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::types::CaseStatus;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// GET /api/cases[?status=] - newest first, scoped by role
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Case>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<CaseStatus>)
        .transpose()
        .map_err(|e| ApiError::invalid_field("status", e))?;

    let cases = state.cases().list_for(&user, status).await?;
    Ok(ApiResponse::success(cases))
}
