use std::sync::Arc;

use crate::{
    AccessControlStore, AccessEvaluationService, AuditTrailService, Clock, GrantService,
    ManagementPolicyService, PermissionRegistryService, RoleAdministrationService,
    RoleAssignmentService, RoleGraphService,
};

/// Every access-control service wired to one store and clock.
#[derive(Clone)]
pub struct AccessControlServices {
    /// Role history and action log.
    pub audit_trail: AuditTrailService,
    /// Roles and hierarchy.
    pub role_graph: RoleGraphService,
    /// Permission catalog.
    pub permission_registry: PermissionRegistryService,
    /// Role grants.
    pub grants: GrantService,
    /// Management edges.
    pub management_policy: ManagementPolicyService,
    /// Read-only decisions.
    pub evaluator: AccessEvaluationService,
    /// Unauthorized user role assignment.
    pub assignments: RoleAssignmentService,
    /// Authorized administration facade.
    pub administration: RoleAdministrationService,
}

impl AccessControlServices {
    /// Builds all services over the given store and clock.
    #[must_use]
    pub fn new(store: Arc<dyn AccessControlStore>, clock: Arc<dyn Clock>) -> Self {
        let audit_trail = AuditTrailService::new(store.clone(), clock.clone());
        let role_graph = RoleGraphService::new(store.clone(), audit_trail.clone(), clock.clone());
        let permission_registry = PermissionRegistryService::new(store.clone(), audit_trail.clone());
        let grants = GrantService::new(store.clone(), audit_trail.clone(), clock.clone());
        let management_policy =
            ManagementPolicyService::new(store.clone(), audit_trail.clone(), clock.clone());
        let evaluator = AccessEvaluationService::new(store.clone());
        let assignments = RoleAssignmentService::new(store, audit_trail.clone(), clock);
        let administration = RoleAdministrationService::new(
            evaluator.clone(),
            role_graph.clone(),
            grants.clone(),
            management_policy.clone(),
            assignments.clone(),
            audit_trail.clone(),
        );

        Self {
            audit_trail,
            role_graph,
            permission_registry,
            grants,
            management_policy,
            evaluator,
            assignments,
            administration,
        }
    }
}
