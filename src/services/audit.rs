use serde_json::Value;
use uuid::Uuid;

use crate::database::models::NewAuditLog;
use crate::database::Repository;

/// Append an audit entry; failures are logged and never fail the caller.
pub async fn record_best_effort(
    repo: &dyn Repository,
    actor_id: Uuid,
    action: &'static str,
    entity_type: &'static str,
    entity_id: Uuid,
    details: Value,
) {
    let entry = NewAuditLog {
        actor_id,
        action,
        entity_type,
        entity_id,
        details,
    };
    if let Err(e) = repo.record_audit(entry).await {
        tracing::warn!(action, %entity_id, "Failed to record audit log: {}", e);
    }
}
