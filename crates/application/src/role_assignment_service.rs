use std::sync::Arc;

use precinct_core::{ActorIdentity, AppError, AppResult, UserId};
use precinct_domain::{AuditAction, RoleId, UserRoleAssignment};
use serde_json::json;
use tracing::info;

use crate::management_policy_service::require_role;
use crate::{
    AccessControlStore, ActionRecord, AuditTrailService, Clock, TransactionMode,
    UserRoleRepository,
};

/// Grants and withdraws roles held by users.
///
/// This service does not authorize the actor; callers outside trusted
/// bootstrap code go through the role administration service.
#[derive(Clone)]
pub struct RoleAssignmentService {
    store: Arc<dyn AccessControlStore>,
    audit_trail: AuditTrailService,
    clock: Arc<dyn Clock>,
}

impl RoleAssignmentService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        store: Arc<dyn AccessControlStore>,
        audit_trail: AuditTrailService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            audit_trail,
            clock,
        }
    }

    /// Assigns a role to a user. Assigning a held role again is a conflict.
    pub async fn assign(
        &self,
        actor: Option<&ActorIdentity>,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<UserRoleAssignment> {
        let mut transaction = self.store.begin(TransactionMode::ReadWrite).await?;
        require_role(transaction.as_mut(), role_id).await?;

        if transaction
            .find_assignment(user_id, role_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "user '{user_id}' already holds role '{role_id}'"
            )));
        }

        let assignment = UserRoleAssignment {
            user_id,
            role_id,
            assigned_by: actor.map(ActorIdentity::user_id),
            assigned_at: self.clock.now(),
        };
        transaction.insert_assignment(&assignment).await?;
        self.audit_trail
            .record_action(
                transaction.as_mut(),
                actor,
                assignment_record(AuditAction::UserRoleAssigned, user_id, role_id),
            )
            .await?;
        transaction.commit().await?;

        info!(user_id = %user_id, role_id = %role_id, "role assigned to user");
        Ok(assignment)
    }

    /// Removes a role from a user.
    pub async fn unassign(
        &self,
        actor: Option<&ActorIdentity>,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let mut transaction = self.store.begin(TransactionMode::ReadWrite).await?;
        if !transaction.delete_assignment(user_id, role_id).await? {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not hold role '{role_id}'"
            )));
        }

        self.audit_trail
            .record_action(
                transaction.as_mut(),
                actor,
                assignment_record(AuditAction::UserRoleUnassigned, user_id, role_id),
            )
            .await?;
        transaction.commit().await?;

        info!(user_id = %user_id, role_id = %role_id, "role removed from user");
        Ok(())
    }
}

fn assignment_record(action: AuditAction, user_id: UserId, role_id: RoleId) -> ActionRecord {
    ActionRecord::new(action.as_str(), "user_role")
        .with_entity_id(format!("{user_id}:{role_id}"))
        .with_detail(json!({
            "user_id": user_id.to_string(),
            "role_id": role_id.to_string(),
        }))
}
