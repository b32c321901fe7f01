use axum::extract::{Path, State};

use crate::api::parse_id;
use crate::database::models::Notification;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// PATCH /api/notifications/:id/read - another user's notification is reported as missing
pub async fn patch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Notification> {
    let notification_id = parse_id(&id, "id")?;
    let notification = state
        .repo
        .mark_notification_read(notification_id, user.id)
        .await
        .map_err(|e| match e {
            DatabaseError::NotFound(_) => ApiError::not_found("Notification not found"),
            other => other.into(),
        })?;
    Ok(ApiResponse::success(notification).with_message("Notification marked as read"))
}
