use super::*;

use precinct_core::UserId;
use precinct_domain::{Role, UserRoleAssignment};

impl RoleAdministrationService {
    /// Lists the roles held by a user.
    pub async fn roles_for_user(
        &self,
        actor: &ActorIdentity,
        user_id: UserId,
    ) -> AppResult<Vec<Role>> {
        self.require(actor, AdminPermission::RoleView).await?;
        self.evaluator.roles_for_user(user_id).await
    }

    /// Assigns a role the actor manages to a user.
    pub async fn assign_role(
        &self,
        actor: &ActorIdentity,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<UserRoleAssignment> {
        self.require_managing(actor, AdminPermission::RoleAssign, &[role_id])
            .await?;
        self.assignments.assign(Some(actor), user_id, role_id).await
    }

    /// Removes a role from a user. The actor must manage both the role and
    /// every role the user currently holds.
    pub async fn unassign_role(
        &self,
        actor: &ActorIdentity,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let mut target_role_ids = self.evaluator.role_ids_for_user(user_id).await?;
        if !target_role_ids.contains(&role_id) {
            target_role_ids.push(role_id);
        }

        self.require_managing(actor, AdminPermission::RoleAssign, &target_role_ids)
            .await?;
        self.assignments.unassign(Some(actor), user_id, role_id).await
    }
}
