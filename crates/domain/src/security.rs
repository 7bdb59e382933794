use std::str::FromStr;

use precinct_core::AppError;
use serde::{Deserialize, Serialize};

/// Permission codes checked by the role administration use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminPermission {
    /// Allows creating roles.
    RoleCreate,
    /// Allows reading roles and their history.
    RoleView,
    /// Allows editing roles, their hierarchy and grants.
    RoleEdit,
    /// Allows deleting roles.
    RoleDelete,
    /// Allows assigning roles to users.
    RoleAssign,
    /// Allows changing management delegation.
    SystemSettings,
    /// Allows reading the action log.
    SystemAudit,
}

impl AdminPermission {
    /// Returns the permission code stored in the registry.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreate => "role.create",
            Self::RoleView => "role.view",
            Self::RoleEdit => "role.edit",
            Self::RoleDelete => "role.delete",
            Self::RoleAssign => "role.assign",
            Self::SystemSettings => "system.settings",
            Self::SystemAudit => "system.audit",
        }
    }

    /// Returns all administration permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AdminPermission] = &[
            AdminPermission::RoleCreate,
            AdminPermission::RoleView,
            AdminPermission::RoleEdit,
            AdminPermission::RoleDelete,
            AdminPermission::RoleAssign,
            AdminPermission::SystemSettings,
            AdminPermission::SystemAudit,
        ];

        ALL
    }
}

impl FromStr for AdminPermission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "role.create" => Ok(Self::RoleCreate),
            "role.view" => Ok(Self::RoleView),
            "role.edit" => Ok(Self::RoleEdit),
            "role.delete" => Ok(Self::RoleDelete),
            "role.assign" => Ok(Self::RoleAssign),
            "system.settings" => Ok(Self::SystemSettings),
            "system.audit" => Ok(Self::SystemAudit),
            _ => Err(AppError::Validation(format!(
                "unknown administration permission '{value}'"
            ))),
        }
    }
}

/// Action tag recorded on role change history entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleChangeAction {
    /// The role was created.
    Created,
    /// A field or the parent of the role changed.
    Updated,
    /// The role was deleted.
    Deleted,
}

impl RoleChangeAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl FromStr for RoleChangeAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "deleted" => Ok(Self::Deleted),
            _ => Err(AppError::Validation(format!(
                "unknown role change action '{value}'"
            ))),
        }
    }
}

/// Stable action tags written to the general action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A permission category was created.
    PermissionCategoryCreated,
    /// A permission was defined.
    PermissionCreated,
    /// A permission was granted to a role.
    PermissionGranted,
    /// A permission grant was revoked.
    PermissionRevoked,
    /// A management edge was added.
    ManagementEdgeAdded,
    /// A management edge was removed.
    ManagementEdgeRemoved,
    /// A role was assigned to a user.
    UserRoleAssigned,
    /// A role was removed from a user.
    UserRoleUnassigned,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionCategoryCreated => "permission.category.created",
            Self::PermissionCreated => "permission.created",
            Self::PermissionGranted => "permission.granted",
            Self::PermissionRevoked => "permission.revoked",
            Self::ManagementEdgeAdded => "management.edge.added",
            Self::ManagementEdgeRemoved => "management.edge.removed",
            Self::UserRoleAssigned => "user.role.assigned",
            Self::UserRoleUnassigned => "user.role.unassigned",
        }
    }
}
