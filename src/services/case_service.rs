use chrono::{Datelike, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{
    Case, CaseFilter, HistoryEntry, MessageEntry, NewCase, NewMessage, NewNotification, User,
    UserSummary,
};
use crate::database::{DatabaseError, Repository};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::access;
use crate::services::audit::record_best_effort;
use crate::services::notifier::{notify_best_effort, Delivery, Notifier};
use crate::types::{CaseStatus, NotificationKind, Role};

const REFERENCE_ATTEMPTS: usize = 3;

/// Input for opening a case, already shape-validated by the handler
#[derive(Debug, Clone)]
pub struct CreateCase {
    pub title: String,
    pub case_type: String,
    pub description: Option<String>,
    pub client_id: Option<Uuid>,
}

#[derive(Debug)]
pub struct Assignment {
    pub case: Case,
    pub delivery: Delivery,
}

#[derive(Debug)]
pub struct StatusChange {
    pub case: Case,
    pub entry: HistoryEntry,
    pub delivery: Delivery,
}

#[derive(Debug)]
pub struct PostedMessage {
    pub message: MessageEntry,
    pub delivery: Delivery,
}

pub struct CaseService {
    repo: Arc<dyn Repository>,
    notifier: Arc<dyn Notifier>,
}

impl CaseService {
    pub fn new(repo: Arc<dyn Repository>, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    /// Cases visible to the caller: own (client), assigned (agent) or all (admin)
    pub async fn list_for(&self, user: &AuthUser, status: Option<CaseStatus>) -> Result<Vec<Case>, ApiError> {
        let mut filter = CaseFilter {
            status,
            ..Default::default()
        };
        match user.role {
            Role::Client => filter.client_id = Some(user.id),
            Role::Agent => filter.agent_id = Some(user.id),
            Role::Admin => {}
        }
        Ok(self.repo.list_cases(&filter).await?)
    }

    /// Fetch a case the caller may read: 404 when absent, 403 when not a reader
    pub async fn get_readable(&self, user: &AuthUser, case_id: Uuid) -> Result<Case, ApiError> {
        let case = self.find(case_id).await?;
        if !access::can_read_case(user, &case) {
            tracing::warn!(user_id = %user.id, %case_id, "Case read denied");
            return Err(ApiError::forbidden("You do not have access to this case"));
        }
        Ok(case)
    }

    async fn find(&self, case_id: Uuid) -> Result<Case, ApiError> {
        self.repo
            .get_case(case_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Case not found"))
    }

    pub async fn create(&self, user: &AuthUser, input: CreateCase) -> Result<Case, ApiError> {
        let (client_id, agent_id) = match user.role {
            Role::Client => {
                if input.client_id.is_some_and(|id| id != user.id) {
                    return Err(ApiError::forbidden("Clients can only open cases for themselves"));
                }
                (user.id, None)
            }
            Role::Agent | Role::Admin => {
                let client_id = input
                    .client_id
                    .ok_or_else(|| ApiError::invalid_field("clientId", "Required when opening a case for a client"))?;
                let client = self
                    .repo
                    .get_user(client_id)
                    .await?
                    .ok_or_else(|| ApiError::not_found("Client not found"))?;
                if client.role != Role::Client {
                    return Err(ApiError::invalid_field("clientId", "User is not a client"));
                }
                // Agents keep working the cases they open
                let agent_id = (user.role == Role::Agent).then_some(user.id);
                (client.id, agent_id)
            }
        };

        let mut attempt = 0;
        let case = loop {
            attempt += 1;
            let new_case = NewCase {
                reference_number: generate_reference_number(),
                title: input.title.clone(),
                case_type: input.case_type.clone(),
                description: input.description.clone(),
                client_id,
                agent_id,
                created_by: user.id,
            };
            match self.repo.create_case(new_case).await {
                Ok(case) => break case,
                Err(DatabaseError::Conflict(_)) if attempt < REFERENCE_ATTEMPTS => {
                    tracing::debug!(attempt, "Reference number collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        };

        tracing::info!(case_id = %case.id, reference = %case.reference_number, created_by = %user.id, "Case created");
        record_best_effort(
            self.repo.as_ref(),
            user.id,
            "case.create",
            "case",
            case.id,
            json!({ "referenceNumber": case.reference_number, "clientId": case.client_id }),
        )
        .await;

        Ok(case)
    }

    /// Admin-only reassignment. Notification failures are logged, not returned.
    pub async fn assign(&self, user: &AuthUser, case_id: Uuid, agent_id: Uuid) -> Result<Assignment, ApiError> {
        if !access::can_assign(user) {
            tracing::warn!(user_id = %user.id, role = %user.role, "Non-admin attempted case assignment");
            return Err(ApiError::forbidden("Only administrators can assign cases"));
        }

        let existing = self.find(case_id).await?;
        let agent = self
            .repo
            .get_user(agent_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Agent not found"))?;
        if agent.role != Role::Agent || !agent.is_active {
            return Err(ApiError::invalid_field("agentId", "User is not an active agent"));
        }

        let case = self.repo.assign_case(case_id, agent.id).await?;
        tracing::info!(%case_id, agent_id = %agent.id, assigned_by = %user.id, "Case assigned");

        record_best_effort(
            self.repo.as_ref(),
            user.id,
            "case.assign",
            "case",
            case.id,
            json!({ "previousAgentId": existing.agent_id, "agentId": agent.id }),
        )
        .await;

        let notifications = vec![
            NewNotification {
                user_id: agent.id,
                kind: NotificationKind::CaseAssigned,
                title: "New case assigned".to_string(),
                body: format!("Case {} ({}) has been assigned to you", case.reference_number, case.title),
                case_id: Some(case.id),
            },
            NewNotification {
                user_id: case.client_id,
                kind: NotificationKind::CaseAssigned,
                title: "Agent assigned".to_string(),
                body: format!("{} is now handling case {}", agent.full_name(), case.reference_number),
                case_id: Some(case.id),
            },
        ];
        let delivery = notify_best_effort(self.notifier.as_ref(), notifications).await;

        Ok(Assignment { case, delivery })
    }

    pub async fn update_status(
        &self,
        user: &AuthUser,
        case_id: Uuid,
        status: CaseStatus,
        notes: Option<String>,
    ) -> Result<StatusChange, ApiError> {
        let existing = self.find(case_id).await?;
        if !access::can_update_status(user, &existing) {
            tracing::warn!(user_id = %user.id, %case_id, "Status change denied");
            return Err(ApiError::forbidden("Only the assigned agent or an administrator can change case status"));
        }
        // Resolved before the write so a failed lookup cannot fail a committed change
        let changed_by_user = self.repo.get_user(user.id).await?.as_ref().map(UserSummary::from);

        let (case, entry) = self
            .repo
            .update_case_status(case_id, status, user.id, notes)
            .await?;
        tracing::info!(%case_id, from = %existing.status, to = %status, changed_by = %user.id, "Case status changed");

        record_best_effort(
            self.repo.as_ref(),
            user.id,
            "case.status",
            "case",
            case.id,
            json!({ "from": existing.status, "to": status }),
        )
        .await;

        let mut recipients = vec![case.client_id];
        if let Some(agent_id) = case.agent_id {
            if agent_id != user.id {
                recipients.push(agent_id);
            }
        }
        let notifications = recipients
            .into_iter()
            .map(|user_id| NewNotification {
                user_id,
                kind: NotificationKind::StatusChanged,
                title: "Case status updated".to_string(),
                body: format!("Case {} is now {}", case.reference_number, status.label()),
                case_id: Some(case.id),
            })
            .collect();
        let delivery = notify_best_effort(self.notifier.as_ref(), notifications).await;

        Ok(StatusChange {
            case,
            entry: HistoryEntry { entry, changed_by_user },
            delivery,
        })
    }

    /// Status history newest-first, each row joined with the user who made the change
    pub async fn history(&self, user: &AuthUser, case_id: Uuid) -> Result<Vec<HistoryEntry>, ApiError> {
        self.get_readable(user, case_id).await?;

        let rows = self.repo.list_status_history(case_id).await?;
        let users = self.summaries(rows.iter().map(|r| r.changed_by)).await?;

        Ok(rows
            .into_iter()
            .map(|entry| HistoryEntry {
                changed_by_user: users.get(&entry.changed_by).cloned(),
                entry,
            })
            .collect())
    }

    pub async fn messages(&self, user: &AuthUser, case_id: Uuid) -> Result<Vec<MessageEntry>, ApiError> {
        self.get_readable(user, case_id).await?;

        let rows = self.repo.list_messages(case_id).await?;
        let users = self.summaries(rows.iter().map(|m| m.sender_id)).await?;

        Ok(rows
            .into_iter()
            .map(|message| MessageEntry {
                sender: users.get(&message.sender_id).cloned(),
                message,
            })
            .collect())
    }

    pub async fn post_message(&self, user: &AuthUser, case_id: Uuid, body: String) -> Result<PostedMessage, ApiError> {
        let case = self.get_readable(user, case_id).await?;
        let sender = self.repo.get_user(user.id).await?;

        let message = self
            .repo
            .create_message(NewMessage {
                case_id,
                sender_id: user.id,
                body,
            })
            .await?;
        tracing::info!(%case_id, sender_id = %user.id, "Case message posted");

        let sender_name = sender.as_ref().map(User::full_name).unwrap_or_else(|| user.email.clone());

        let notifications = [Some(case.client_id), case.agent_id]
            .into_iter()
            .flatten()
            .filter(|id| *id != user.id)
            .map(|user_id| NewNotification {
                user_id,
                kind: NotificationKind::NewMessage,
                title: "New message".to_string(),
                body: format!("{} sent a message on case {}", sender_name, case.reference_number),
                case_id: Some(case.id),
            })
            .collect();
        let delivery = notify_best_effort(self.notifier.as_ref(), notifications).await;

        Ok(PostedMessage {
            message: MessageEntry {
                message,
                sender: sender.as_ref().map(UserSummary::from),
            },
            delivery,
        })
    }

    /// One batched lookup for all distinct user ids referenced by a listing
    async fn summaries(&self, ids: impl Iterator<Item = Uuid>) -> Result<HashMap<Uuid, UserSummary>, ApiError> {
        let mut ids: Vec<Uuid> = ids.collect();
        ids.sort_unstable();
        ids.dedup();

        let users = self.repo.get_users(&ids).await?;
        Ok(users.iter().map(|u| (u.id, UserSummary::from(u))).collect())
    }
}

/// `IMM-<year>-<6 uppercase hex>`
pub fn generate_reference_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("IMM-{}-{}", Utc::now().year(), suffix)
}
