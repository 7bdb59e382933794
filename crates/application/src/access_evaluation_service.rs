use std::collections::BTreeSet;
use std::sync::Arc;

use precinct_core::{ActorIdentity, AppError, AppResult, UserId};
use precinct_domain::{PermissionCode, Role, RoleId};

use crate::management_policy_service::{can_manage_in, require_role};
use crate::{
    AccessControlStore, AccessControlTransaction, GrantRepository, TransactionMode,
    UserRoleRepository,
};

/// Read-only decisions over roles, grants and management edges.
///
/// Each call evaluates against a single read-only snapshot and never writes.
#[derive(Clone)]
pub struct AccessEvaluationService {
    store: Arc<dyn AccessControlStore>,
}

impl AccessEvaluationService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(store: Arc<dyn AccessControlStore>) -> Self {
        Self { store }
    }

    /// Returns the union of permissions granted directly to the held roles.
    pub async fn effective_permissions(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<BTreeSet<PermissionCode>> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        effective_permissions_in(transaction.as_mut(), role_ids).await
    }

    /// Returns whether any held role is granted the permission code.
    ///
    /// A malformed code is never granted.
    pub async fn has_permission(&self, role_ids: &[RoleId], code: &str) -> AppResult<bool> {
        let Ok(code) = PermissionCode::new(code) else {
            return Ok(false);
        };
        Ok(self.effective_permissions(role_ids).await?.contains(&code))
    }

    /// Returns whether any actor role has a direct edge to the target role.
    pub async fn can_manage_role(
        &self,
        actor_role_ids: &[RoleId],
        target_role_id: RoleId,
    ) -> AppResult<bool> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        can_manage_in(transaction.as_mut(), actor_role_ids, target_role_id).await
    }

    /// Returns whether every target role is manageable by some actor role.
    ///
    /// A target holding no roles is trivially manageable.
    pub async fn can_manage_user(
        &self,
        actor_role_ids: &[RoleId],
        target_role_ids: &[RoleId],
    ) -> AppResult<bool> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        can_manage_all_in(transaction.as_mut(), actor_role_ids, target_role_ids).await
    }

    /// Lists identifiers of the roles held by a user.
    pub async fn role_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleId>> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        transaction.list_role_ids_for_user(user_id).await
    }

    /// Lists the roles held by a user ordered by name.
    pub async fn roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        let role_ids = transaction.list_role_ids_for_user(user_id).await?;

        let mut roles = Vec::with_capacity(role_ids.len());
        for role_id in role_ids {
            roles.push(require_role(transaction.as_mut(), role_id).await?);
        }

        roles.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(roles)
    }

    /// Fails with a forbidden error unless the actor holds the permission.
    pub async fn require_permission(&self, actor: &ActorIdentity, code: &str) -> AppResult<()> {
        let code = PermissionCode::new(code)?;
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        let role_ids = transaction.list_role_ids_for_user(actor.user_id()).await?;

        if effective_permissions_in(transaction.as_mut(), &role_ids)
            .await?
            .contains(&code)
        {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' is missing permission '{code}'",
            actor.user_id()
        )))
    }

    /// Fails with a forbidden error unless the actor holds the permission and
    /// may manage every listed role.
    pub async fn require_permission_to_manage(
        &self,
        actor: &ActorIdentity,
        code: &str,
        target_role_ids: &[RoleId],
    ) -> AppResult<()> {
        self.require_permission(actor, code).await?;

        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        let role_ids = transaction.list_role_ids_for_user(actor.user_id()).await?;
        if can_manage_all_in(transaction.as_mut(), &role_ids, target_role_ids).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' may not manage the requested roles",
            actor.user_id()
        )))
    }
}

async fn effective_permissions_in(
    transaction: &mut dyn AccessControlTransaction,
    role_ids: &[RoleId],
) -> AppResult<BTreeSet<PermissionCode>> {
    let distinct_role_ids: BTreeSet<RoleId> = role_ids.iter().copied().collect();

    let mut codes = BTreeSet::new();
    for role_id in distinct_role_ids {
        codes.extend(
            transaction
                .list_permissions_for_role(role_id)
                .await?
                .into_iter()
                .map(|permission| permission.code().clone()),
        );
    }

    Ok(codes)
}

async fn can_manage_all_in(
    transaction: &mut dyn AccessControlTransaction,
    actor_role_ids: &[RoleId],
    target_role_ids: &[RoleId],
) -> AppResult<bool> {
    for target_role_id in target_role_ids {
        if !can_manage_in(transaction, actor_role_ids, *target_role_id).await? {
            return Ok(false);
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests;
