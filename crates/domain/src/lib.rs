//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod hierarchy;
mod management;
mod permission;
mod role;
mod security;

pub use hierarchy::{
    MAX_HIERARCHY_DEPTH, RoleForest, ensure_reparent_allowed, hierarchy_depth_exceeded,
};
pub use management::{ManagementEdge, RoleGrant, UserRoleAssignment};
pub use permission::{
    PERMISSION_CODE_MAX_LENGTH, PERMISSION_NAME_MAX_LENGTH, Permission, PermissionCategory,
    PermissionCategoryId, PermissionCode, PermissionId,
};
pub use role::{DEFAULT_ROLE_LEVEL, ROLE_NAME_MAX_LENGTH, Role, RoleFieldUpdate, RoleId, RoleParts};
pub use security::{AdminPermission, AuditAction, RoleChangeAction};
