use std::sync::Arc;

use precinct_core::{ActorIdentity, AppError, AppResult};
use precinct_domain::{AuditAction, ManagementEdge, Role, RoleId};
use serde_json::json;
use tracing::info;

use crate::{
    AccessControlStore, AccessControlTransaction, ActionRecord, AuditTrailService, Clock,
    ManagementEdgeRepository, RoleRepository, TransactionMode,
};

const MANAGEMENT_EDGE_ENTITY: &str = "role_management_edge";

/// Maintains explicit "may administer" edges between roles.
///
/// Authority is never derived: an edge A -> B says nothing about B -> A, about
/// roles below B in the hierarchy, or about the levels of A and B.
#[derive(Clone)]
pub struct ManagementPolicyService {
    store: Arc<dyn AccessControlStore>,
    audit_trail: AuditTrailService,
    clock: Arc<dyn Clock>,
}

impl ManagementPolicyService {
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

    /// Lets `manager_role_id` administer `manageable_role_id`.
    pub async fn add_edge(
        &self,
        actor: &ActorIdentity,
        manager_role_id: RoleId,
        manageable_role_id: RoleId,
    ) -> AppResult<ManagementEdge> {
        let edge = ManagementEdge::new(
            manager_role_id,
            manageable_role_id,
            Some(actor.user_id()),
            self.clock.now(),
        )?;

        let mut transaction = self.store.begin(TransactionMode::ReadWrite).await?;
        require_role(transaction.as_mut(), manager_role_id).await?;
        require_role(transaction.as_mut(), manageable_role_id).await?;

        if transaction
            .find_edge(manager_role_id, manageable_role_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "role '{manager_role_id}' already manages role '{manageable_role_id}'"
            )));
        }

        transaction.insert_edge(&edge).await?;
        self.audit_trail
            .record_action(
                transaction.as_mut(),
                Some(actor),
                edge_record(AuditAction::ManagementEdgeAdded, &edge),
            )
            .await?;
        transaction.commit().await?;

        info!(
            manager_role_id = %manager_role_id,
            manageable_role_id = %manageable_role_id,
            actor = %actor.user_id(),
            "management edge added"
        );
        Ok(edge)
    }

    /// Removes an existing edge.
    pub async fn remove_edge(
        &self,
        actor: &ActorIdentity,
        manager_role_id: RoleId,
        manageable_role_id: RoleId,
    ) -> AppResult<()> {
        let mut transaction = self.store.begin(TransactionMode::ReadWrite).await?;
        let edge = transaction
            .find_edge(manager_role_id, manageable_role_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "role '{manager_role_id}' does not manage role '{manageable_role_id}'"
                ))
            })?;

        transaction
            .delete_edge(manager_role_id, manageable_role_id)
            .await?;
        self.audit_trail
            .record_action(
                transaction.as_mut(),
                Some(actor),
                edge_record(AuditAction::ManagementEdgeRemoved, &edge),
            )
            .await?;
        transaction.commit().await?;

        info!(
            manager_role_id = %manager_role_id,
            manageable_role_id = %manageable_role_id,
            actor = %actor.user_id(),
            "management edge removed"
        );
        Ok(())
    }

    /// Returns whether any of `actor_role_ids` has a direct edge to the target.
    pub async fn can_manage(
        &self,
        actor_role_ids: &[RoleId],
        target_role_id: RoleId,
    ) -> AppResult<bool> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        can_manage_in(transaction.as_mut(), actor_role_ids, target_role_id).await
    }

    /// Lists roles the given role may administer, ordered by name.
    pub async fn manageable_roles(&self, manager_role_id: RoleId) -> AppResult<Vec<Role>> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        require_role(transaction.as_mut(), manager_role_id).await?;

        let edges = transaction.list_edges_from(manager_role_id).await?;
        let mut roles = Vec::with_capacity(edges.len());
        for edge in edges {
            roles.push(require_role(transaction.as_mut(), edge.manageable_role_id()).await?);
        }

        roles.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(roles)
    }
}

/// Evaluates management authority inside an open transaction.
pub(crate) async fn can_manage_in(
    transaction: &mut dyn AccessControlTransaction,
    actor_role_ids: &[RoleId],
    target_role_id: RoleId,
) -> AppResult<bool> {
    if actor_role_ids.is_empty() {
        return Ok(false);
    }

    transaction
        .has_edge_from_any(actor_role_ids, target_role_id)
        .await
}

/// Loads a role or reports it as missing.
pub(crate) async fn require_role(
    transaction: &mut dyn AccessControlTransaction,
    role_id: RoleId,
) -> AppResult<Role> {
    transaction
        .find_role(role_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
}

fn edge_record(action: AuditAction, edge: &ManagementEdge) -> ActionRecord {
    ActionRecord::new(action.as_str(), MANAGEMENT_EDGE_ENTITY)
        .with_entity_id(format!(
            "{}:{}",
            edge.manager_role_id(),
            edge.manageable_role_id()
        ))
        .with_detail(json!({
            "manager_role_id": edge.manager_role_id().to_string(),
            "manageable_role_id": edge.manageable_role_id().to_string(),
        }))
}
