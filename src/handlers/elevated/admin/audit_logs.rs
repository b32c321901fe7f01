use axum::extract::{Query, State};
use serde::Deserialize;

use crate::api::parse_id;
use crate::database::models::{AuditFilter, AuditLog};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::types::Role;

const MAX_LIMIT: i64 = 500;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    pub entity_id: Option<String>,
    pub limit: Option<String>,
}

impl AuditQuery {
    fn into_filter(self) -> Result<AuditFilter, ApiError> {
        let mut filter = AuditFilter::default();
        if let Some(raw) = self.entity_id.as_deref() {
            filter.entity_id = Some(parse_id(raw, "entityId")?);
        }
        if let Some(raw) = self.limit.as_deref() {
            filter.limit = raw
                .parse::<i64>()
                .ok()
                .filter(|n| (1..=MAX_LIMIT).contains(n))
                .ok_or_else(|| ApiError::invalid_field("limit", format!("Must be between 1 and {}", MAX_LIMIT)))?;
        }
        Ok(filter)
    }
}

/// GET /api/admin/audit-logs[?entityId=&limit=] - newest first
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Vec<AuditLog>> {
    user.require_role(&[Role::Admin], "view audit logs")?;
    let filter = query.into_filter()?;
    let logs = state.repo.list_audit_logs(&filter).await?;
    Ok(ApiResponse::success(logs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_bounds() {
        assert_eq!(AuditQuery::default().into_filter().unwrap().limit, 100);

        let query = AuditQuery { limit: Some("500".into()), ..Default::default() };
        assert_eq!(query.into_filter().unwrap().limit, 500);

        for bad in ["0", "501", "ten"] {
            let query = AuditQuery { limit: Some(bad.into()), ..Default::default() };
            assert!(query.into_filter().is_err(), "limit {} should be rejected", bad);
        }
    }
}
