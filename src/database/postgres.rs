use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    AuditFilter, AuditLog, Case, CaseFilter, CaseMessage, NewAuditLog, NewCase, NewMessage,
    NewNotification, NewUser, Notification, ProfileChanges, StatusHistory, User,
};
use crate::database::repository::Repository;
use crate::types::{CaseStatus, Role};

/// Repository backed by a Postgres pool
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE ($1::user_role IS NULL OR role = $1) ORDER BY last_name, first_name",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, first_name, last_name, phone, nationality, role, is_verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(&user.nationality)
        .bind(user.role)
        .bind(user.is_verified)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_unique(e, &format!("User with email '{}'", user.email)))
    }

    async fn update_profile(&self, id: Uuid, changes: &ProfileChanges) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = COALESCE($4, phone),
                nationality = COALESCE($5, nationality),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.phone)
        .bind(&changes.nationality)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    async fn list_cases(&self, filter: &CaseFilter) -> Result<Vec<Case>, DatabaseError> {
        let cases = sqlx::query_as::<_, Case>(
            r#"
            SELECT * FROM cases
            WHERE ($1::uuid IS NULL OR client_id = $1)
              AND ($2::uuid IS NULL OR agent_id = $2)
              AND ($3::case_status IS NULL OR status = $3)
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .bind(filter.client_id)
        .bind(filter.agent_id)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;
        Ok(cases)
    }

    async fn get_case(&self, id: Uuid) -> Result<Option<Case>, DatabaseError> {
        let case = sqlx::query_as::<_, Case>("SELECT * FROM cases WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(case)
    }

    async fn create_case(&self, case: NewCase) -> Result<Case, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Case>(
            r#"
            INSERT INTO cases (id, reference_number, title, case_type, description, status, client_id, agent_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&case.reference_number)
        .bind(&case.title)
        .bind(&case.case_type)
        .bind(&case.description)
        .bind(CaseStatus::Submitted)
        .bind(case.client_id)
        .bind(case.agent_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from_unique(e, &format!("Case '{}'", case.reference_number)))?;

        sqlx::query(
            "INSERT INTO status_history (id, case_id, status, notes, changed_by) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(created.id)
        .bind(CaseStatus::Submitted)
        .bind(Some("Case created"))
        .bind(case.created_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn assign_case(&self, id: Uuid, agent_id: Uuid) -> Result<Case, DatabaseError> {
        sqlx::query_as::<_, Case>(
            "UPDATE cases SET agent_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(agent_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Case not found".to_string()))
    }

    async fn update_case_status(
        &self,
        id: Uuid,
        status: CaseStatus,
        changed_by: Uuid,
        notes: Option<String>,
    ) -> Result<(Case, StatusHistory), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let case = sqlx::query_as::<_, Case>(
            "UPDATE cases SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Case not found".to_string()))?;

        let entry = sqlx::query_as::<_, StatusHistory>(
            r#"
            INSERT INTO status_history (id, case_id, status, notes, changed_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(status)
        .bind(&notes)
        .bind(changed_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((case, entry))
    }

    async fn list_status_history(&self, case_id: Uuid) -> Result<Vec<StatusHistory>, DatabaseError> {
        let rows = sqlx::query_as::<_, StatusHistory>(
            "SELECT * FROM status_history WHERE case_id = $1 ORDER BY created_at DESC, seq DESC",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_messages(&self, case_id: Uuid) -> Result<Vec<CaseMessage>, DatabaseError> {
        let rows = sqlx::query_as::<_, CaseMessage>(
            "SELECT * FROM case_messages WHERE case_id = $1 ORDER BY created_at ASC, seq ASC",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_message(&self, message: NewMessage) -> Result<CaseMessage, DatabaseError> {
        let row = sqlx::query_as::<_, CaseMessage>(
            "INSERT INTO case_messages (id, case_id, sender_id, body) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(message.case_id)
        .bind(message.sender_id)
        .bind(&message.body)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_notification(&self, notification: NewNotification) -> Result<Notification, DatabaseError> {
        let row = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, body, case_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(notification.user_id)
        .bind(notification.kind)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.case_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_notifications(&self, user_id: Uuid, unread_only: bool) -> Result<Vec<Notification>, DatabaseError> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR read_at IS NULL)
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification, DatabaseError> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications SET read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Notification not found".to_string()))
    }

    async fn record_audit(&self, entry: NewAuditLog) -> Result<AuditLog, DatabaseError> {
        let row = sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs (id, actor_id, action, entity_type, entity_id, details)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.actor_id)
        .bind(entry.action)
        .bind(entry.entity_type)
        .bind(entry.entity_id)
        .bind(&entry.details)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_audit_logs(&self, filter: &AuditFilter) -> Result<Vec<AuditLog>, DatabaseError> {
        let rows = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT * FROM audit_logs
            WHERE ($1::uuid IS NULL OR entity_id = $1)
            ORDER BY created_at DESC, seq DESC
            LIMIT $2
            "#,
        )
        .bind(filter.entity_id)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
