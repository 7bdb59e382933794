use chrono::{DateTime, Utc};
use precinct_core::{AppError, AppResult, UserId};
use serde::{Deserialize, Serialize};

use crate::{PermissionId, RoleId};

/// Directed authorization fact: `manager` may administer `manageable`.
///
/// Edges are neither symmetric nor transitive, and are not inherited through
/// the role hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementEdge {
    manager_role_id: RoleId,
    manageable_role_id: RoleId,
    created_by: Option<UserId>,
    created_at: DateTime<Utc>,
}

impl ManagementEdge {
    /// Creates an edge, rejecting self-edges.
    pub fn new(
        manager_role_id: RoleId,
        manageable_role_id: RoleId,
        created_by: Option<UserId>,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if manager_role_id == manageable_role_id {
            return Err(AppError::Validation(format!(
                "role '{manager_role_id}' cannot be granted management of itself"
            )));
        }

        Ok(Self {
            manager_role_id,
            manageable_role_id,
            created_by,
            created_at,
        })
    }

    /// Returns the managing role.
    #[must_use]
    pub fn manager_role_id(&self) -> RoleId {
        self.manager_role_id
    }

    /// Returns the managed role.
    #[must_use]
    pub fn manageable_role_id(&self) -> RoleId {
        self.manageable_role_id
    }

    /// Returns the user who created the edge.
    #[must_use]
    pub fn created_by(&self) -> Option<UserId> {
        self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Attributable assignment of one permission to one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    /// Receiving role.
    pub role_id: RoleId,
    /// Granted permission.
    pub permission_id: PermissionId,
    /// Granting user.
    pub granted_by: Option<UserId>,
    /// Grant timestamp.
    pub granted_at: DateTime<Utc>,
}

/// A user holding a role. Users may hold any number of roles at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleAssignment {
    /// Assigned user.
    pub user_id: UserId,
    /// Held role.
    pub role_id: RoleId,
    /// Assigning user.
    pub assigned_by: Option<UserId>,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
}
