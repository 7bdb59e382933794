//! Application services and ports.

#![forbid(unsafe_code)]

mod access_control_ports;
mod access_control_services;
mod access_evaluation_service;
mod audit_trail_service;
mod grant_service;
mod management_policy_service;
mod permission_registry_service;
mod role_administration_service;
mod role_assignment_service;
mod role_graph_service;

#[cfg(test)]
mod test_support;

pub use access_control_ports::{
    AccessControlStore, AccessControlTransaction, ActionEvent, ActionLogEntry, ActionLogQuery,
    AuditTrailRepository, Clock, GrantRepository, ManagementEdgeRepository, PermissionRepository,
    RoleChangeEntry, RoleChangeEvent, RoleDependents, RoleHistoryQuery, RoleRepository,
    TransactionMode, UserRoleRepository,
};
pub use access_control_services::AccessControlServices;
pub use access_evaluation_service::AccessEvaluationService;
pub use audit_trail_service::{ActionRecord, AuditTrailService, MAX_AUDIT_PAGE_SIZE};
pub use grant_service::GrantService;
pub use management_policy_service::ManagementPolicyService;
pub use permission_registry_service::{
    CreateCategoryInput, CreatePermissionInput, PermissionRegistryService,
};
pub use role_administration_service::RoleAdministrationService;
pub use role_assignment_service::RoleAssignmentService;
pub use role_graph_service::{CreateRoleInput, RoleGraphService};
