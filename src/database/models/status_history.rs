use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::UserSummary;
use crate::types::CaseStatus;

/// Append-only; rows are never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistory {
    pub id: Uuid,
    pub case_id: Uuid,
    pub status: CaseStatus,
    pub notes: Option<String>,
    pub changed_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// History row joined with the user who made the change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub entry: StatusHistory,
    pub changed_by_user: Option<UserSummary>,
}
