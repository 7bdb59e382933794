use std::sync::Arc;

use precinct_core::{ActorIdentity, AppError, AppResult};
use precinct_domain::{Role, RoleId};
use tracing::warn;

use crate::management_policy_service::{can_manage_in, require_role};
use crate::{
    AccessControlStore, AccessControlTransaction, AuditTrailService, Clock, RoleRepository,
    UserRoleRepository,
};

mod mutations;
mod queries;

/// Input payload for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Display name, 1 to 50 characters.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Informational seniority, defaults to 1.
    pub level: Option<i32>,
    /// Optional parent role.
    pub parent_id: Option<RoleId>,
    /// Marks a built-in role.
    pub is_system: bool,
}

/// Roles and their parent/child hierarchy.
///
/// Every mutation writes its role change entry in the same transaction as the
/// role row, so a failed audit write leaves the role untouched.
#[derive(Clone)]
pub struct RoleGraphService {
    store: Arc<dyn AccessControlStore>,
    audit_trail: AuditTrailService,
    clock: Arc<dyn Clock>,
}

impl RoleGraphService {
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

    /// System roles may only be changed by actors holding a role with a
    /// direct management edge to them.
    async fn require_system_override(
        transaction: &mut dyn AccessControlTransaction,
        actor: &ActorIdentity,
        role: &Role,
    ) -> AppResult<()> {
        if !role.is_system() {
            return Ok(());
        }

        let actor_role_ids = transaction.list_role_ids_for_user(actor.user_id()).await?;
        if can_manage_in(transaction, &actor_role_ids, role.id()).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' may not modify system role '{}'",
            actor.user_id(),
            role.name()
        )))
    }
}

fn warn_on_level_inversion(role: &Role, parent: &Role) {
    if role.level() >= parent.level() {
        warn!(
            role_id = %role.id(),
            role_level = role.level(),
            parent_id = %parent.id(),
            parent_level = parent.level(),
            "role level is not below its parent's level"
        );
    }
}

async fn warn_on_child_level_inversions(
    transaction: &mut dyn AccessControlTransaction,
    role: &Role,
) -> AppResult<()> {
    if let Some(parent_id) = role.parent_id() {
        let parent = require_role(transaction, parent_id).await?;
        warn_on_level_inversion(role, &parent);
    }

    for child in transaction.list_child_roles(role.id()).await? {
        warn_on_level_inversion(&child, role);
    }

    Ok(())
}
