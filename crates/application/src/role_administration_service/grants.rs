use super::*;

use precinct_domain::{Permission, PermissionId, RoleGrant};

impl RoleAdministrationService {
    /// Lists the direct grants of a role.
    pub async fn grants_for_role(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
    ) -> AppResult<Vec<Permission>> {
        self.require(actor, AdminPermission::RoleView).await?;
        self.grants.grants_for_role(role_id).await
    }

    /// Grants a permission to a role the actor manages.
    pub async fn grant_permission(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<RoleGrant> {
        self.require_managing(actor, AdminPermission::RoleEdit, &[role_id])
            .await?;
        self.grants.grant(actor, role_id, permission_id).await
    }

    /// Revokes a permission from a role the actor manages.
    pub async fn revoke_permission(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.require_managing(actor, AdminPermission::RoleEdit, &[role_id])
            .await?;
        self.grants.revoke(actor, role_id, permission_id).await
    }
}
