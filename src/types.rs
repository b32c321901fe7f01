/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The sole authorization axis: every user holds exactly one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Client,
    Agent,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Agent => "AGENT",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CLIENT" => Ok(Role::Client),
            "AGENT" => Ok(Role::Agent),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Case lifecycle status. Transitions are driven by handler calls, not an internal engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "case_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Submitted,
    UnderReview,
    DocumentsRequired,
    Processing,
    Approved,
    Rejected,
    Closed,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 7] = [
        CaseStatus::Submitted,
        CaseStatus::UnderReview,
        CaseStatus::DocumentsRequired,
        CaseStatus::Processing,
        CaseStatus::Approved,
        CaseStatus::Rejected,
        CaseStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Submitted => "SUBMITTED",
            CaseStatus::UnderReview => "UNDER_REVIEW",
            CaseStatus::DocumentsRequired => "DOCUMENTS_REQUIRED",
            CaseStatus::Processing => "PROCESSING",
            CaseStatus::Approved => "APPROVED",
            CaseStatus::Rejected => "REJECTED",
            CaseStatus::Closed => "CLOSED",
        }
    }

    /// Human-readable label used in notification text.
    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::Submitted => "Submitted",
            CaseStatus::UnderReview => "Under review",
            CaseStatus::DocumentsRequired => "Documents required",
            CaseStatus::Processing => "Processing",
            CaseStatus::Approved => "Approved",
            CaseStatus::Rejected => "Rejected",
            CaseStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        CaseStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == upper)
            .ok_or_else(|| format!("unknown case status '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "notification_kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    CaseAssigned,
    StatusChanged,
    NewMessage,
}

/// Named rate-limit configurations; quotas come from `ApiConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateLimitPreset {
    Standard,
    Strict,
    Relaxed,
}

impl RateLimitPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitPreset::Standard => "STANDARD",
            RateLimitPreset::Strict => "STRICT",
            RateLimitPreset::Relaxed => "RELAXED",
        }
    }
}
