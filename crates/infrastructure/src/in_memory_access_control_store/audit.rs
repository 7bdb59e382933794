use async_trait::async_trait;

use precinct_application::{
    ActionEvent, ActionLogEntry, ActionLogQuery, AuditTrailRepository, RoleChangeEntry,
    RoleChangeEvent, RoleHistoryQuery,
};
use precinct_core::{AppError, AppResult};
use precinct_domain::RoleId;

use super::InMemoryAccessControlTransaction;

fn next_entry_id(length: usize) -> i64 {
    i64::try_from(length).unwrap_or(i64::MAX).saturating_add(1)
}

impl InMemoryAccessControlTransaction {
    fn reject_injected_audit_failure(&self) -> AppResult<()> {
        if self.fail_audit_writes {
            return Err(AppError::Persistence(
                "audit storage is unavailable".to_owned(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl AuditTrailRepository for InMemoryAccessControlTransaction {
    async fn append_role_change(&mut self, event: RoleChangeEvent) -> AppResult<()> {
        self.reject_injected_audit_failure()?;
        let state = self.writable()?;

        let entry_id = next_entry_id(state.role_changes.len());
        state.role_changes.push(RoleChangeEntry {
            entry_id,
            role_id: event.role_id,
            changed_by: event.changed_by,
            action: event.action,
            previous: event.previous,
            new: event.new,
            changed_at: event.changed_at,
        });
        Ok(())
    }

    async fn append_action(&mut self, event: ActionEvent) -> AppResult<()> {
        self.reject_injected_audit_failure()?;
        let state = self.writable()?;

        let entry_id = next_entry_id(state.actions.len());
        state.actions.push(ActionLogEntry {
            entry_id,
            actor_id: event.actor_id,
            action: event.action,
            entity_type: event.entity_type,
            entity_id: event.entity_id,
            detail: event.detail,
            origin: event.origin,
            client: event.client,
            created_at: event.created_at,
        });
        Ok(())
    }

    async fn list_role_changes(
        &mut self,
        role_id: RoleId,
        query: RoleHistoryQuery,
    ) -> AppResult<Vec<RoleChangeEntry>> {
        Ok(self
            .state
            .role_changes
            .iter()
            .rev()
            .filter(|entry| entry.role_id == role_id)
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn list_actions(&mut self, query: ActionLogQuery) -> AppResult<Vec<ActionLogEntry>> {
        Ok(self
            .state
            .actions
            .iter()
            .rev()
            .filter(|entry| {
                query
                    .action
                    .as_deref()
                    .is_none_or(|action| entry.action == action)
            })
            .filter(|entry| {
                query
                    .actor_id
                    .is_none_or(|actor_id| entry.actor_id == Some(actor_id))
            })
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }
}
