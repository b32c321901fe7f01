use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{parse_id, JsonBody};
use crate::database::models::Case;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub agent_id: Uuid,
}

/// PUT /api/admin/cases/:id/assign
///
/// The assignment stands even when notifying the agent or client fails; the message says so.
pub async fn put(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<AssignRequest>,
) -> ApiResult<Case> {
    let case_id = parse_id(&id, "id")?;
    let assignment = state.cases().assign(&user, case_id, body.agent_id).await?;

    let message = if assignment.delivery.all_delivered() {
        "Case assigned successfully"
    } else {
        "Case assigned; notification could not be delivered"
    };
    Ok(ApiResponse::success(assignment.case).with_message(message))
}
