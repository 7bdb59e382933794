mod assignments;
mod audit;
mod clock;
mod grants;
mod management;
mod permissions;
mod roles;
mod store;

pub use assignments::UserRoleRepository;
pub use audit::{
    ActionEvent, ActionLogEntry, ActionLogQuery, AuditTrailRepository, RoleChangeEntry,
    RoleChangeEvent, RoleHistoryQuery,
};
pub use clock::Clock;
pub use grants::GrantRepository;
pub use management::ManagementEdgeRepository;
pub use permissions::PermissionRepository;
pub use roles::{RoleDependents, RoleRepository};
pub use store::{AccessControlStore, AccessControlTransaction, TransactionMode};
