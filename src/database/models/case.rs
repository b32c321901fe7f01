use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::CaseStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: Uuid,
    pub reference_number: String,
    pub title: String,
    pub case_type: String,
    pub description: Option<String>,
    pub status: CaseStatus,
    pub client_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCase {
    pub reference_number: String,
    pub title: String,
    pub case_type: String,
    pub description: Option<String>,
    pub client_id: Uuid,
    pub agent_id: Option<Uuid>,
    /// Recorded as the author of the initial SUBMITTED history entry.
    pub created_by: Uuid,
}

/// Conjunctive filter for case listings; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    pub client_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub status: Option<CaseStatus>,
}

impl CaseFilter {
    pub fn matches(&self, case: &Case) -> bool {
        self.client_id.map_or(true, |id| case.client_id == id)
            && self.agent_id.map_or(true, |id| case.agent_id == Some(id))
            && self.status.map_or(true, |s| case.status == s)
    }
}
