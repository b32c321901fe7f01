use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use crate::api::validate::normalize;
use crate::api::{parse_id, FieldErrors, JsonBody};
use crate::database::models::{Case, HistoryEntry};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::types::CaseStatus;

/// Unknown status strings fail deserialization and surface as a validation error
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: CaseStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdated {
    pub case: Case,
    pub history: HistoryEntry,
}

/// PATCH /api/cases/:id/status - assigned agent or admin
pub async fn patch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateStatusRequest>,
) -> ApiResult<StatusUpdated> {
    let case_id = parse_id(&id, "id")?;
    let mut errors = FieldErrors::new();
    if body.notes.as_deref().is_some_and(|n| n.chars().count() > 2000) {
        errors.add("notes", "Must be at most 2000 characters");
    }
    errors.into_result()?;

    let change = state
        .cases()
        .update_status(&user, case_id, body.status, normalize(body.notes))
        .await?;

    let message = if change.delivery.all_delivered() {
        format!("Case status updated to {}", change.case.status.label())
    } else {
        format!(
            "Case status updated to {}; some notifications could not be delivered",
            change.case.status.label()
        )
    };
    Ok(ApiResponse::success(StatusUpdated {
        case: change.case,
        history: change.entry,
    })
    .with_message(message))
}
