use axum::extract::{Query, State};
use serde::Deserialize;

use crate::database::models::Notification;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub unread: Option<String>,
}

impl ListQuery {
    fn unread_only(&self) -> bool {
        matches!(self.unread.as_deref(), Some("true") | Some("1"))
    }
}

/// GET /api/notifications[?unread=true] - own notifications, newest first
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Notification>> {
    let notifications = state.repo.list_notifications(user.id, query.unread_only()).await?;
    Ok(ApiResponse::success(notifications))
}
