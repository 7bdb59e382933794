use super::*;

use precinct_core::AppError;
use precinct_domain::{Role, RoleFieldUpdate};

use crate::CreateRoleInput;

impl RoleAdministrationService {
    /// Lists all roles for actors allowed to view them.
    pub async fn list_roles(&self, actor: &ActorIdentity) -> AppResult<Vec<Role>> {
        self.require(actor, AdminPermission::RoleView).await?;
        self.role_graph.list_roles().await
    }

    /// Returns one role for actors allowed to view roles.
    pub async fn find_role(&self, actor: &ActorIdentity, role_id: RoleId) -> AppResult<Role> {
        self.require(actor, AdminPermission::RoleView).await?;
        self.role_graph.find_role(role_id).await
    }

    /// Creates a role. Placing it under a parent requires managing that parent.
    ///
    /// System roles are only created by catalog seeding, never through this
    /// entry point.
    pub async fn create_role(
        &self,
        actor: &ActorIdentity,
        input: CreateRoleInput,
    ) -> AppResult<Role> {
        if input.is_system {
            return Err(AppError::Forbidden(format!(
                "user '{}' may not create system role '{}'",
                actor.user_id(),
                input.name
            )));
        }

        match input.parent_id {
            Some(parent_id) => {
                self.require_managing(actor, AdminPermission::RoleCreate, &[parent_id])
                    .await?;
            }
            None => self.require(actor, AdminPermission::RoleCreate).await?,
        }

        self.role_graph.create_role(actor, input).await
    }

    /// Updates fields of a role the actor manages.
    pub async fn update_role(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        update: RoleFieldUpdate,
    ) -> AppResult<Role> {
        self.require_managing(actor, AdminPermission::RoleEdit, &[role_id])
            .await?;
        self.role_graph.update_role(actor, role_id, update).await
    }

    /// Moves a role the actor manages within the hierarchy.
    pub async fn set_parent(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        parent_id: Option<RoleId>,
    ) -> AppResult<Role> {
        self.require_managing(actor, AdminPermission::RoleEdit, &[role_id])
            .await?;
        self.role_graph.set_parent(actor, role_id, parent_id).await
    }

    /// Deletes a role the actor manages.
    pub async fn delete_role(&self, actor: &ActorIdentity, role_id: RoleId) -> AppResult<()> {
        self.require_managing(actor, AdminPermission::RoleDelete, &[role_id])
            .await?;
        self.role_graph.delete_role(actor, role_id).await
    }
}
