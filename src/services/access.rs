//! Role-based read/write rules for cases. Role is the only authorization axis.

use crate::database::models::Case;
use crate::middleware::AuthUser;
use crate::types::Role;

/// Readers of a case: the owning client, the assigned agent, or any admin.
pub fn can_read_case(user: &AuthUser, case: &Case) -> bool {
    match user.role {
        Role::Admin => true,
        Role::Agent => case.agent_id == Some(user.id),
        Role::Client => case.client_id == user.id,
    }
}

/// Status changes are staff-only: the assigned agent or an admin.
pub fn can_update_status(user: &AuthUser, case: &Case) -> bool {
    match user.role {
        Role::Admin => true,
        Role::Agent => case.agent_id == Some(user.id),
        Role::Client => false,
    }
}

pub fn can_assign(user: &AuthUser) -> bool {
    user.is_admin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CaseStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "u@example.com".into(),
            role,
        }
    }

    fn case_for(client: Uuid, agent: Option<Uuid>) -> Case {
        Case {
            id: Uuid::new_v4(),
            reference_number: "IMM-2026-000001".into(),
            title: "Family visa".into(),
            case_type: "FAMILY_VISA".into(),
            description: None,
            status: CaseStatus::Submitted,
            client_id: client,
            agent_id: agent,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn clients_read_only_their_own_cases() {
        let owner = user(Role::Client);
        let stranger = user(Role::Client);
        let case = case_for(owner.id, None);
        assert!(can_read_case(&owner, &case));
        assert!(!can_read_case(&stranger, &case));
        assert!(!can_update_status(&owner, &case));
    }

    #[test]
    fn agents_need_assignment() {
        let agent = user(Role::Agent);
        let other = user(Role::Agent);
        let case = case_for(Uuid::new_v4(), Some(agent.id));
        assert!(can_read_case(&agent, &case));
        assert!(can_update_status(&agent, &case));
        assert!(!can_read_case(&other, &case));
        assert!(!can_update_status(&other, &case));
        assert!(!can_assign(&agent));
    }

    #[test]
    fn admins_read_and_assign_everything() {
        let admin = user(Role::Admin);
        let case = case_for(Uuid::new_v4(), None);
        assert!(can_read_case(&admin, &case));
        assert!(can_update_status(&admin, &case));
        assert!(can_assign(&admin));
    }
}
