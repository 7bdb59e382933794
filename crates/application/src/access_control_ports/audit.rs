use async_trait::async_trait;
use chrono::{DateTime, Utc};
use precinct_core::{AppResult, UserId};
use precinct_domain::{RoleChangeAction, RoleId};
use serde_json::Value;

/// Role change history row to append.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleChangeEvent {
    /// Changed role.
    pub role_id: RoleId,
    /// Acting user.
    pub changed_by: UserId,
    /// Change tag.
    pub action: RoleChangeAction,
    /// Full state before the change, absent on create.
    pub previous: Option<Value>,
    /// Full state after the change, absent on delete.
    pub new: Option<Value>,
    /// Change timestamp.
    pub changed_at: DateTime<Utc>,
}

/// Stored role change history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleChangeEntry {
    /// Monotonic entry identifier.
    pub entry_id: i64,
    /// Changed role.
    pub role_id: RoleId,
    /// Acting user.
    pub changed_by: UserId,
    /// Change tag.
    pub action: RoleChangeAction,
    /// Full state before the change.
    pub previous: Option<Value>,
    /// Full state after the change.
    pub new: Option<Value>,
    /// Change timestamp.
    pub changed_at: DateTime<Utc>,
}

/// General action log row to append.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEvent {
    /// Acting user, absent for system actions.
    pub actor_id: Option<UserId>,
    /// Stable action tag.
    pub action: String,
    /// Affected entity type.
    pub entity_type: String,
    /// Affected entity identifier.
    pub entity_id: Option<String>,
    /// Structured detail payload.
    pub detail: Value,
    /// Network origin of the request.
    pub origin: Option<String>,
    /// Client descriptor of the request.
    pub client: Option<String>,
    /// Event timestamp.
    pub created_at: DateTime<Utc>,
}

/// Stored action log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionLogEntry {
    /// Monotonic entry identifier.
    pub entry_id: i64,
    /// Acting user, absent for system actions.
    pub actor_id: Option<UserId>,
    /// Stable action tag.
    pub action: String,
    /// Affected entity type.
    pub entity_type: String,
    /// Affected entity identifier.
    pub entity_id: Option<String>,
    /// Structured detail payload.
    pub detail: Value,
    /// Network origin of the request.
    pub origin: Option<String>,
    /// Client descriptor of the request.
    pub client: Option<String>,
    /// Event timestamp.
    pub created_at: DateTime<Utc>,
}

/// Paging parameters for role history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleHistoryQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

/// Paging and filter parameters for the action log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLogQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Optional exact action tag filter.
    pub action: Option<String>,
    /// Optional actor filter.
    pub actor_id: Option<UserId>,
}

/// Append-only audit persistence within a unit of work.
#[async_trait]
pub trait AuditTrailRepository: Send {
    /// Appends a role change history entry.
    async fn append_role_change(&mut self, event: RoleChangeEvent) -> AppResult<()>;

    /// Appends an action log entry.
    async fn append_action(&mut self, event: ActionEvent) -> AppResult<()>;

    /// Lists history entries of one role, newest first.
    async fn list_role_changes(
        &mut self,
        role_id: RoleId,
        query: RoleHistoryQuery,
    ) -> AppResult<Vec<RoleChangeEntry>>;

    /// Lists action log entries, newest first.
    async fn list_actions(&mut self, query: ActionLogQuery) -> AppResult<Vec<ActionLogEntry>>;
}
