use std::sync::Arc;

use precinct_core::{ActorIdentity, AppError, AppResult};
use precinct_domain::{Role, RoleChangeAction, RoleId};
use serde_json::Value;

use crate::{
    AccessControlStore, AccessControlTransaction, ActionEvent, ActionLogEntry, ActionLogQuery,
    AuditTrailRepository, Clock, RoleChangeEntry, RoleChangeEvent, RoleHistoryQuery,
    TransactionMode,
};

/// Largest page served by audit queries.
pub const MAX_AUDIT_PAGE_SIZE: usize = 500;

/// Describes one action log write.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    /// Stable action tag.
    pub action: String,
    /// Affected entity type.
    pub entity_type: String,
    /// Affected entity identifier.
    pub entity_id: Option<String>,
    /// Structured detail payload.
    pub detail: Value,
}

impl ActionRecord {
    /// Creates a record with no entity identifier and an empty detail object.
    #[must_use]
    pub fn new(action: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: None,
            detail: Value::Object(serde_json::Map::new()),
        }
    }

    /// Sets the affected entity identifier.
    #[must_use]
    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Sets the structured detail payload.
    #[must_use]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }
}

/// Writes and reads the append-only role history and action log.
#[derive(Clone)]
pub struct AuditTrailService {
    store: Arc<dyn AccessControlStore>,
    clock: Arc<dyn Clock>,
}

impl AuditTrailService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(store: Arc<dyn AccessControlStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Appends a role change entry inside the caller's transaction.
    ///
    /// A failure here must abort the caller's mutation.
    pub async fn record_role_change(
        &self,
        transaction: &mut dyn AccessControlTransaction,
        role_id: RoleId,
        actor: &ActorIdentity,
        action: RoleChangeAction,
        previous: Option<&Role>,
        new: Option<&Role>,
    ) -> AppResult<()> {
        transaction
            .append_role_change(RoleChangeEvent {
                role_id,
                changed_by: actor.user_id(),
                action,
                previous: previous.map(Role::snapshot).transpose()?,
                new: new.map(Role::snapshot).transpose()?,
                changed_at: self.clock.now(),
            })
            .await
    }

    /// Appends an action log entry inside the caller's transaction.
    pub async fn record_action(
        &self,
        transaction: &mut dyn AccessControlTransaction,
        actor: Option<&ActorIdentity>,
        record: ActionRecord,
    ) -> AppResult<()> {
        transaction
            .append_action(ActionEvent {
                actor_id: actor.map(ActorIdentity::user_id),
                action: record.action,
                entity_type: record.entity_type,
                entity_id: record.entity_id,
                detail: record.detail,
                origin: actor.and_then(ActorIdentity::origin).map(str::to_owned),
                client: actor.and_then(ActorIdentity::client).map(str::to_owned),
                created_at: self.clock.now(),
            })
            .await
    }

    /// Appends a standalone action log entry in its own transaction.
    pub async fn log_action(
        &self,
        actor: Option<&ActorIdentity>,
        record: ActionRecord,
    ) -> AppResult<()> {
        let mut transaction = self.store.begin(TransactionMode::ReadWrite).await?;
        self.record_action(transaction.as_mut(), actor, record).await?;
        transaction.commit().await
    }

    /// Returns history entries of a role, newest first.
    ///
    /// Entries outlive the role, so deleted roles still return their history.
    pub async fn history_for_role(
        &self,
        role_id: RoleId,
        query: RoleHistoryQuery,
    ) -> AppResult<Vec<RoleChangeEntry>> {
        let query = RoleHistoryQuery {
            limit: page_limit(query.limit)?,
            offset: query.offset,
        };

        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        transaction.list_role_changes(role_id, query).await
    }

    /// Returns action log entries, newest first.
    pub async fn list_actions(&self, query: ActionLogQuery) -> AppResult<Vec<ActionLogEntry>> {
        let query = ActionLogQuery {
            limit: page_limit(query.limit)?,
            ..query
        };

        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        transaction.list_actions(query).await
    }
}

fn page_limit(limit: usize) -> AppResult<usize> {
    if limit == 0 {
        return Err(AppError::Validation(
            "page limit must be greater than zero".to_owned(),
        ));
    }

    Ok(limit.min(MAX_AUDIT_PAGE_SIZE))
}
