use super::*;

use precinct_domain::{
    DEFAULT_ROLE_LEVEL, MAX_HIERARCHY_DEPTH, RoleChangeAction, RoleFieldUpdate,
    ensure_reparent_allowed, hierarchy_depth_exceeded,
};
use tracing::info;

use crate::TransactionMode;

impl RoleGraphService {
    /// Creates a role, optionally under an existing parent.
    pub async fn create_role(
        &self,
        actor: &ActorIdentity,
        input: CreateRoleInput,
    ) -> AppResult<Role> {
        let role = Role::create(
            input.name,
            input.description,
            input.level.unwrap_or(DEFAULT_ROLE_LEVEL),
            input.parent_id,
            input.is_system,
            actor.user_id(),
            self.clock.now(),
        )?;

        let mut transaction = self.store.begin(TransactionMode::ReadWrite).await?;
        if let Some(parent_id) = role.parent_id() {
            let parent = lock_existing_role(transaction.as_mut(), parent_id).await?;
            warn_on_level_inversion(&role, &parent);
        }

        transaction.insert_role(&role).await?;
        self.audit_trail
            .record_role_change(
                transaction.as_mut(),
                role.id(),
                actor,
                RoleChangeAction::Created,
                None,
                Some(&role),
            )
            .await?;
        transaction.commit().await?;

        info!(role_id = %role.id(), name = %role.name(), actor = %actor.user_id(), "role created");
        Ok(role)
    }

    /// Changes name, description or level of a role.
    pub async fn update_role(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        update: RoleFieldUpdate,
    ) -> AppResult<Role> {
        if update.is_empty() {
            return Err(AppError::Validation(
                "role update must change at least one field".to_owned(),
            ));
        }
        let level_changed = update.level.is_some();

        let mut transaction = self.store.begin(TransactionMode::ReadWrite).await?;
        let mut role = lock_existing_role(transaction.as_mut(), role_id).await?;
        Self::require_system_override(transaction.as_mut(), actor, &role).await?;

        let previous = role.clone();
        role.apply_update(update, actor.user_id(), self.clock.now())?;
        transaction.update_role(&role).await?;
        if level_changed {
            warn_on_child_level_inversions(transaction.as_mut(), &role).await?;
        }

        self.audit_trail
            .record_role_change(
                transaction.as_mut(),
                role_id,
                actor,
                RoleChangeAction::Updated,
                Some(&previous),
                Some(&role),
            )
            .await?;
        transaction.commit().await?;

        info!(role_id = %role_id, actor = %actor.user_id(), "role updated");
        Ok(role)
    }

    /// Moves a role under a new parent, or to the top level when `parent_id`
    /// is `None`.
    ///
    /// The target row and every row on the candidate parent's ancestor chain
    /// stay locked until commit, so concurrent re-parents cannot combine into
    /// a cycle.
    pub async fn set_parent(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        parent_id: Option<RoleId>,
    ) -> AppResult<Role> {
        let mut transaction = self.store.begin(TransactionMode::ReadWrite).await?;
        let mut role = lock_existing_role(transaction.as_mut(), role_id).await?;

        let parent = match parent_id {
            Some(parent_id) => {
                ensure_reparent_allowed(role_id, parent_id, &[])?;
                let (parent, ancestor_ids) =
                    lock_ancestor_chain(transaction.as_mut(), parent_id).await?;
                ensure_reparent_allowed(role_id, parent_id, &ancestor_ids)?;
                Some(parent)
            }
            None => None,
        };
        Self::require_system_override(transaction.as_mut(), actor, &role).await?;

        let previous = role.clone();
        role.reparent(parent_id, actor.user_id(), self.clock.now());
        transaction.update_role(&role).await?;
        if let Some(parent) = &parent {
            warn_on_level_inversion(&role, parent);
        }

        self.audit_trail
            .record_role_change(
                transaction.as_mut(),
                role_id,
                actor,
                RoleChangeAction::Updated,
                Some(&previous),
                Some(&role),
            )
            .await?;
        transaction.commit().await?;

        info!(
            role_id = %role_id,
            parent_id = ?parent_id.map(|id| id.to_string()),
            actor = %actor.user_id(),
            "role re-parented"
        );
        Ok(role)
    }

    /// Deletes a custom role that nothing references anymore.
    pub async fn delete_role(&self, actor: &ActorIdentity, role_id: RoleId) -> AppResult<()> {
        let mut transaction = self.store.begin(TransactionMode::ReadWrite).await?;
        let role = lock_existing_role(transaction.as_mut(), role_id).await?;

        if role.is_system() {
            return Err(AppError::Conflict(format!(
                "system role '{}' cannot be deleted",
                role.name()
            )));
        }

        let dependents = transaction.count_role_dependents(role_id).await?;
        if !dependents.is_empty() {
            return Err(AppError::Conflict(format!(
                "role '{}' is still referenced by {} child roles, {} grants, {} management edges and {} user assignments",
                role.name(),
                dependents.children,
                dependents.grants,
                dependents.management_edges,
                dependents.assignments
            )));
        }

        transaction.delete_role(role_id).await?;
        self.audit_trail
            .record_role_change(
                transaction.as_mut(),
                role_id,
                actor,
                RoleChangeAction::Deleted,
                Some(&role),
                None,
            )
            .await?;
        transaction.commit().await?;

        info!(role_id = %role_id, name = %role.name(), actor = %actor.user_id(), "role deleted");
        Ok(())
    }
}

async fn lock_existing_role(
    transaction: &mut dyn AccessControlTransaction,
    role_id: RoleId,
) -> AppResult<Role> {
    transaction
        .lock_role(role_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
}

/// Locks the candidate parent and each of its ancestors, returning the parent
/// and the ancestor identifiers nearest first.
async fn lock_ancestor_chain(
    transaction: &mut dyn AccessControlTransaction,
    parent_id: RoleId,
) -> AppResult<(Role, Vec<RoleId>)> {
    let parent = lock_existing_role(transaction, parent_id).await?;

    let mut ancestor_ids = Vec::new();
    let mut next = parent.parent_id();
    while let Some(ancestor_id) = next {
        if ancestor_ids.len() == MAX_HIERARCHY_DEPTH {
            return Err(hierarchy_depth_exceeded(parent_id));
        }

        let ancestor = transaction.lock_role(ancestor_id).await?.ok_or_else(|| {
            AppError::Internal(format!(
                "role '{ancestor_id}' referenced as parent does not exist"
            ))
        })?;
        ancestor_ids.push(ancestor_id);
        next = ancestor.parent_id();
    }

    Ok((parent, ancestor_ids))
}
