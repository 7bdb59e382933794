use std::sync::Arc;

use precinct_core::{ActorIdentity, AppError, AppResult};
use precinct_domain::{AuditAction, Permission, PermissionId, RoleGrant, RoleId};
use serde_json::json;
use tracing::info;

use crate::management_policy_service::require_role;
use crate::{
    AccessControlStore, ActionRecord, AuditTrailService, Clock, GrantRepository,
    PermissionRepository, TransactionMode,
};

/// Role to permission grants.
#[derive(Clone)]
pub struct GrantService {
    store: Arc<dyn AccessControlStore>,
    audit_trail: AuditTrailService,
    clock: Arc<dyn Clock>,
}

impl GrantService {
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

    /// Grants a permission to a role. Re-granting an existing pair is a conflict.
    pub async fn grant(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<RoleGrant> {
        let mut transaction = self.store.begin(TransactionMode::ReadWrite).await?;
        require_role(transaction.as_mut(), role_id).await?;
        let permission = transaction
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' was not found"))
            })?;

        if transaction
            .find_grant(role_id, permission_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "role '{role_id}' already holds permission '{}'",
                permission.code()
            )));
        }

        let grant = RoleGrant {
            role_id,
            permission_id,
            granted_by: Some(actor.user_id()),
            granted_at: self.clock.now(),
        };
        transaction.insert_grant(&grant).await?;
        self.audit_trail
            .record_action(
                transaction.as_mut(),
                Some(actor),
                grant_record(AuditAction::PermissionGranted, role_id, &permission),
            )
            .await?;
        transaction.commit().await?;

        info!(role_id = %role_id, permission = %permission.code(), "permission granted");
        Ok(grant)
    }

    /// Revokes an existing grant.
    pub async fn revoke(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let mut transaction = self.store.begin(TransactionMode::ReadWrite).await?;
        if !transaction.delete_grant(role_id, permission_id).await? {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' does not hold permission '{permission_id}'"
            )));
        }

        let permission = transaction
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "granted permission '{permission_id}' is missing from the registry"
                ))
            })?;
        self.audit_trail
            .record_action(
                transaction.as_mut(),
                Some(actor),
                grant_record(AuditAction::PermissionRevoked, role_id, &permission),
            )
            .await?;
        transaction.commit().await?;

        info!(role_id = %role_id, permission = %permission.code(), "permission revoked");
        Ok(())
    }

    /// Lists permissions granted directly to a role, ordered by code.
    pub async fn grants_for_role(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        require_role(transaction.as_mut(), role_id).await?;
        transaction.list_permissions_for_role(role_id).await
    }
}

fn grant_record(action: AuditAction, role_id: RoleId, permission: &Permission) -> ActionRecord {
    ActionRecord::new(action.as_str(), "role_permission")
        .with_entity_id(format!("{role_id}:{}", permission.id()))
        .with_detail(json!({
            "role_id": role_id.to_string(),
            "permission_id": permission.id().to_string(),
            "code": permission.code().as_str(),
        }))
}
