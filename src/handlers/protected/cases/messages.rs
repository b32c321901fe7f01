use axum::extract::{Path, State};
use serde::Deserialize;

use crate::api::{parse_id, FieldErrors, JsonBody};
use crate::database::models::MessageEntry;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

const BODY_MAX: usize = 5000;

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub body: String,
}

/// GET /api/cases/:id/messages - oldest first
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<MessageEntry>> {
    let case_id = parse_id(&id, "id")?;
    let messages = state.cases().messages(&user, case_id).await?;
    Ok(ApiResponse::success(messages))
}

/// POST /api/cases/:id/messages
pub async fn post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<PostMessageRequest>,
) -> ApiResult<MessageEntry> {
    let case_id = parse_id(&id, "id")?;
    let mut errors = FieldErrors::new();
    errors.require_text("body", &request.body, BODY_MAX);
    errors.into_result()?;

    let posted = state
        .cases()
        .post_message(&user, case_id, request.body.trim().to_string())
        .await?;
    Ok(ApiResponse::created(posted.message).with_message("Message sent"))
}
