use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    AuditFilter, AuditLog, Case, CaseFilter, CaseMessage, NewAuditLog, NewCase, NewMessage,
    NewNotification, NewUser, Notification, ProfileChanges, StatusHistory, User,
};
use crate::database::repository::Repository;
use crate::types::{CaseStatus, Role};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    cases: Vec<Case>,
    history: Vec<StatusHistory>,
    messages: Vec<CaseMessage>,
    notifications: Vec<Notification>,
    audit_logs: Vec<AuditLog>,
}

/// Process-local repository for tests and database-less development runs.
///
/// Rows live in insertion order; newest-first listings walk the vectors backwards so
/// rows created within the same clock tick keep a stable order.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T: Clone>(rows: &[T], keep: impl Fn(&T) -> bool) -> Vec<T> {
    rows.iter().rev().filter(|r| keep(*r)).cloned().collect()
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .iter()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));
        Ok(users)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(DatabaseError::Conflict(format!(
                "User with email '{}' already exists",
                user.email
            )));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            nationality: user.nationality,
            role: user.role,
            is_active: true,
            is_verified: user.is_verified,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn update_profile(&self, id: Uuid, changes: &ProfileChanges) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))?;
        changes.apply(user);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn list_cases(&self, filter: &CaseFilter) -> Result<Vec<Case>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.cases, |c| filter.matches(c)))
    }

    async fn get_case(&self, id: Uuid) -> Result<Option<Case>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.cases.iter().find(|c| c.id == id).cloned())
    }

    async fn create_case(&self, case: NewCase) -> Result<Case, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.cases.iter().any(|c| c.reference_number == case.reference_number) {
            return Err(DatabaseError::Conflict(format!(
                "Case '{}' already exists",
                case.reference_number
            )));
        }
        let now = Utc::now();
        let created = Case {
            id: Uuid::new_v4(),
            reference_number: case.reference_number,
            title: case.title,
            case_type: case.case_type,
            description: case.description,
            status: CaseStatus::Submitted,
            client_id: case.client_id,
            agent_id: case.agent_id,
            created_at: now,
            updated_at: now,
        };
        tables.history.push(StatusHistory {
            id: Uuid::new_v4(),
            case_id: created.id,
            status: CaseStatus::Submitted,
            notes: Some("Case created".to_string()),
            changed_by: case.created_by,
            created_at: now,
        });
        tables.cases.push(created.clone());
        Ok(created)
    }

    async fn assign_case(&self, id: Uuid, agent_id: Uuid) -> Result<Case, DatabaseError> {
        let mut tables = self.tables.write().await;
        let case = tables
            .cases
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DatabaseError::NotFound("Case not found".to_string()))?;
        case.agent_id = Some(agent_id);
        case.updated_at = Utc::now();
        Ok(case.clone())
    }

    async fn update_case_status(
        &self,
        id: Uuid,
        status: CaseStatus,
        changed_by: Uuid,
        notes: Option<String>,
    ) -> Result<(Case, StatusHistory), DatabaseError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let case = tables
            .cases
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DatabaseError::NotFound("Case not found".to_string()))?;
        case.status = status;
        case.updated_at = now;
        let case = case.clone();

        let entry = StatusHistory {
            id: Uuid::new_v4(),
            case_id: id,
            status,
            notes,
            changed_by,
            created_at: now,
        };
        tables.history.push(entry.clone());
        Ok((case, entry))
    }

    async fn list_status_history(&self, case_id: Uuid) -> Result<Vec<StatusHistory>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.history, |h| h.case_id == case_id))
    }

    async fn list_messages(&self, case_id: Uuid) -> Result<Vec<CaseMessage>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.messages.iter().filter(|m| m.case_id == case_id).cloned().collect())
    }

    async fn create_message(&self, message: NewMessage) -> Result<CaseMessage, DatabaseError> {
        let mut tables = self.tables.write().await;
        let created = CaseMessage {
            id: Uuid::new_v4(),
            case_id: message.case_id,
            sender_id: message.sender_id,
            body: message.body,
            created_at: Utc::now(),
        };
        tables.messages.push(created.clone());
        Ok(created)
    }

    async fn create_notification(&self, notification: NewNotification) -> Result<Notification, DatabaseError> {
        let mut tables = self.tables.write().await;
        let created = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            kind: notification.kind,
            title: notification.title,
            body: notification.body,
            case_id: notification.case_id,
            read_at: None,
            created_at: Utc::now(),
        };
        tables.notifications.push(created.clone());
        Ok(created)
    }

    async fn list_notifications(&self, user_id: Uuid, unread_only: bool) -> Result<Vec<Notification>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.notifications, |n| {
            n.user_id == user_id && (!unread_only || n.read_at.is_none())
        }))
    }

    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification, DatabaseError> {
        let mut tables = self.tables.write().await;
        let notification = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .ok_or_else(|| DatabaseError::NotFound("Notification not found".to_string()))?;
        if notification.read_at.is_none() {
            notification.read_at = Some(Utc::now());
        }
        Ok(notification.clone())
    }

    async fn record_audit(&self, entry: NewAuditLog) -> Result<AuditLog, DatabaseError> {
        let mut tables = self.tables.write().await;
        let created = AuditLog {
            id: Uuid::new_v4(),
            actor_id: entry.actor_id,
            action: entry.action.to_string(),
            entity_type: entry.entity_type.to_string(),
            entity_id: entry.entity_id,
            details: entry.details,
            created_at: Utc::now(),
        };
        tables.audit_logs.push(created.clone());
        Ok(created)
    }

    async fn list_audit_logs(&self, filter: &AuditFilter) -> Result<Vec<AuditLog>, DatabaseError> {
        let tables = self.tables.read().await;
        let limit = usize::try_from(filter.limit.max(0)).unwrap_or(0);
        Ok(tables
            .audit_logs
            .iter()
            .rev()
            .filter(|a| filter.entity_id.map_or(true, |id| a.entity_id == id))
            .take(limit)
            .cloned()
            .collect())
    }
}
