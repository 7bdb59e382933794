use precinct_core::{ActorIdentity, AppResult};
use precinct_domain::{AdminPermission, RoleId};

use crate::{
    AccessEvaluationService, AuditTrailService, GrantService, ManagementPolicyService,
    RoleAssignmentService, RoleGraphService,
};

mod assignments;
mod audit;
mod delegation;
mod grants;
mod roles;

/// Authorized entry point for role administration requests.
///
/// Every command checks the actor's effective permissions and management
/// authority before delegating to the underlying services.
///
/// Authorization reads its own snapshot, committed before the command's
/// write transaction begins. A grant, edge or assignment revoked while a
/// command is in flight therefore takes effect from the next command on.
#[derive(Clone)]
pub struct RoleAdministrationService {
    evaluator: AccessEvaluationService,
    role_graph: RoleGraphService,
    grants: GrantService,
    management_policy: ManagementPolicyService,
    assignments: RoleAssignmentService,
    audit_trail: AuditTrailService,
}

impl RoleAdministrationService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        evaluator: AccessEvaluationService,
        role_graph: RoleGraphService,
        grants: GrantService,
        management_policy: ManagementPolicyService,
        assignments: RoleAssignmentService,
        audit_trail: AuditTrailService,
    ) -> Self {
        Self {
            evaluator,
            role_graph,
            grants,
            management_policy,
            assignments,
            audit_trail,
        }
    }

    async fn require(&self, actor: &ActorIdentity, permission: AdminPermission) -> AppResult<()> {
        self.evaluator
            .require_permission(actor, permission.as_str())
            .await
    }

    async fn require_managing(
        &self,
        actor: &ActorIdentity,
        permission: AdminPermission,
        target_role_ids: &[RoleId],
    ) -> AppResult<()> {
        self.evaluator
            .require_permission_to_manage(actor, permission.as_str(), target_role_ids)
            .await
    }
}

#[cfg(test)]
mod tests;
