use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use precinct_application::{
    AccessControlStore, AccessControlTransaction, ActionLogEntry, RoleChangeEntry,
    TransactionMode,
};
use precinct_core::{AppError, AppResult, UserId};
use precinct_domain::{
    ManagementEdge, Permission, PermissionCategory, PermissionCategoryId, PermissionId, Role,
    RoleGrant, RoleId, UserRoleAssignment,
};

mod assignments;
mod audit;
mod grants;
mod management;
mod permissions;
mod roles;

#[derive(Debug, Clone, Default)]
struct AccessControlState {
    roles: HashMap<RoleId, Role>,
    categories: HashMap<PermissionCategoryId, PermissionCategory>,
    permissions: HashMap<PermissionId, Permission>,
    grants: HashMap<(RoleId, PermissionId), RoleGrant>,
    edges: HashMap<(RoleId, RoleId), ManagementEdge>,
    assignments: HashMap<(UserId, RoleId), UserRoleAssignment>,
    role_changes: Vec<RoleChangeEntry>,
    actions: Vec<ActionLogEntry>,
}

/// In-memory access-control store.
///
/// Writers are serialized: a read-write transaction holds the store lock and
/// edits a private copy that replaces the shared state on commit. Read-only
/// transactions work on a snapshot taken at begin.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccessControlStore {
    state: Arc<Mutex<AccessControlState>>,
    fail_audit_writes: bool,
}

impl InMemoryAccessControlStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store whose audit appends always fail.
    #[must_use]
    pub fn with_failing_audit_writes() -> Self {
        Self {
            state: Arc::default(),
            fail_audit_writes: true,
        }
    }
}

#[async_trait]
impl AccessControlStore for InMemoryAccessControlStore {
    async fn begin(&self, mode: TransactionMode) -> AppResult<Box<dyn AccessControlTransaction>> {
        let transaction = match mode {
            TransactionMode::ReadOnly => InMemoryAccessControlTransaction {
                guard: None,
                state: self.state.lock().await.clone(),
                fail_audit_writes: self.fail_audit_writes,
            },
            TransactionMode::ReadWrite => {
                let guard = Arc::clone(&self.state).lock_owned().await;
                InMemoryAccessControlTransaction {
                    state: guard.clone(),
                    guard: Some(guard),
                    fail_audit_writes: self.fail_audit_writes,
                }
            }
        };

        Ok(Box::new(transaction))
    }
}

/// Open in-memory unit of work.
pub struct InMemoryAccessControlTransaction {
    guard: Option<OwnedMutexGuard<AccessControlState>>,
    state: AccessControlState,
    fail_audit_writes: bool,
}

impl InMemoryAccessControlTransaction {
    fn writable(&mut self) -> AppResult<&mut AccessControlState> {
        if self.guard.is_none() {
            return Err(AppError::Persistence(
                "cannot write in a read-only transaction".to_owned(),
            ));
        }

        Ok(&mut self.state)
    }
}

#[async_trait]
impl AccessControlTransaction for InMemoryAccessControlTransaction {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        let Self { guard, state, .. } = *self;
        if let Some(mut guard) = guard {
            *guard = state;
        }

        Ok(())
    }
}
