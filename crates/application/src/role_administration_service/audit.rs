use super::*;

use crate::{ActionLogEntry, ActionLogQuery, RoleChangeEntry, RoleHistoryQuery};

impl RoleAdministrationService {
    /// Returns the change history of a role, newest first.
    pub async fn role_history(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        query: RoleHistoryQuery,
    ) -> AppResult<Vec<RoleChangeEntry>> {
        self.require(actor, AdminPermission::RoleView).await?;
        self.audit_trail.history_for_role(role_id, query).await
    }

    /// Returns recent action log entries.
    pub async fn list_actions(
        &self,
        actor: &ActorIdentity,
        query: ActionLogQuery,
    ) -> AppResult<Vec<ActionLogEntry>> {
        self.require(actor, AdminPermission::SystemAudit).await?;
        self.audit_trail.list_actions(query).await
    }
}
