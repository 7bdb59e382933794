use super::*;

use precinct_domain::{ManagementEdge, Role};

impl RoleAdministrationService {
    /// Adds a management edge. Requires system settings access.
    pub async fn add_management_edge(
        &self,
        actor: &ActorIdentity,
        manager_role_id: RoleId,
        manageable_role_id: RoleId,
    ) -> AppResult<ManagementEdge> {
        self.require(actor, AdminPermission::SystemSettings).await?;
        self.management_policy
            .add_edge(actor, manager_role_id, manageable_role_id)
            .await
    }

    /// Removes a management edge. Requires system settings access.
    pub async fn remove_management_edge(
        &self,
        actor: &ActorIdentity,
        manager_role_id: RoleId,
        manageable_role_id: RoleId,
    ) -> AppResult<()> {
        self.require(actor, AdminPermission::SystemSettings).await?;
        self.management_policy
            .remove_edge(actor, manager_role_id, manageable_role_id)
            .await
    }

    /// Lists the roles a role may administer.
    pub async fn manageable_roles(
        &self,
        actor: &ActorIdentity,
        manager_role_id: RoleId,
    ) -> AppResult<Vec<Role>> {
        self.require(actor, AdminPermission::RoleView).await?;
        self.management_policy
            .manageable_roles(manager_role_id)
            .await
    }
}
