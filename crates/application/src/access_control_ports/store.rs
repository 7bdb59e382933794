use async_trait::async_trait;
use precinct_core::AppResult;

use super::{
    AuditTrailRepository, GrantRepository, ManagementEdgeRepository, PermissionRepository,
    RoleRepository, UserRoleRepository,
};

/// Isolation requested when opening a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// Repeatable-read snapshot that rejects writes.
    ReadOnly,
    /// Read-committed transaction for mutations.
    ReadWrite,
}

/// Entry point to access-control persistence.
#[async_trait]
pub trait AccessControlStore: Send + Sync {
    /// Opens a new unit of work.
    async fn begin(&self, mode: TransactionMode) -> AppResult<Box<dyn AccessControlTransaction>>;
}

/// Open unit of work exposing every access-control repository.
///
/// Dropping the handle without calling [`AccessControlTransaction::commit`]
/// rolls back every write made through it.
#[async_trait]
pub trait AccessControlTransaction:
    RoleRepository
    + PermissionRepository
    + GrantRepository
    + ManagementEdgeRepository
    + UserRoleRepository
    + AuditTrailRepository
    + Send
{
    /// Makes all writes of this unit of work durable.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}
