use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    AuditFilter, AuditLog, Case, CaseFilter, CaseMessage, NewAuditLog, NewCase, NewMessage,
    NewNotification, NewUser, Notification, ProfileChanges, StatusHistory, User,
};
use crate::types::{CaseStatus, Role};

/// Data-store seam shared by handlers and services.
///
/// Listing methods return rows in display order: cases, history, notifications and audit
/// logs newest-first; messages oldest-first. Methods returning a bare entity report a
/// missing row as `DatabaseError::NotFound`.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    // Users
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError>;
    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, DatabaseError>;
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn update_profile(&self, id: Uuid, changes: &ProfileChanges) -> Result<User, DatabaseError>;

    // Cases
    async fn list_cases(&self, filter: &CaseFilter) -> Result<Vec<Case>, DatabaseError>;
    async fn get_case(&self, id: Uuid) -> Result<Option<Case>, DatabaseError>;
    /// Inserts the case together with its initial SUBMITTED history entry.
    async fn create_case(&self, case: NewCase) -> Result<Case, DatabaseError>;
    async fn assign_case(&self, id: Uuid, agent_id: Uuid) -> Result<Case, DatabaseError>;
    /// Sets the status and appends the history entry as one unit.
    async fn update_case_status(
        &self,
        id: Uuid,
        status: CaseStatus,
        changed_by: Uuid,
        notes: Option<String>,
    ) -> Result<(Case, StatusHistory), DatabaseError>;
    async fn list_status_history(&self, case_id: Uuid) -> Result<Vec<StatusHistory>, DatabaseError>;

    // Messages
    async fn list_messages(&self, case_id: Uuid) -> Result<Vec<CaseMessage>, DatabaseError>;
    async fn create_message(&self, message: NewMessage) -> Result<CaseMessage, DatabaseError>;

    // Notifications
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification, DatabaseError>;
    async fn list_notifications(&self, user_id: Uuid, unread_only: bool) -> Result<Vec<Notification>, DatabaseError>;
    /// Only the owner may mark a notification read; other users see `NotFound`.
    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification, DatabaseError>;

    // Audit
    async fn record_audit(&self, entry: NewAuditLog) -> Result<AuditLog, DatabaseError>;
    async fn list_audit_logs(&self, filter: &AuditFilter) -> Result<Vec<AuditLog>, DatabaseError>;
}
