//! Shared fakes for service tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use precinct_core::{ActorIdentity, AppError, AppResult, UserId};
use precinct_domain::{
    ManagementEdge, Permission, PermissionCategory, PermissionCategoryId, PermissionCode,
    PermissionId, Role, RoleGrant, RoleId, UserRoleAssignment,
};

use crate::{
    AccessControlServices, AccessControlStore, AccessControlTransaction, ActionEvent,
    ActionLogEntry, ActionLogQuery, AuditTrailRepository, Clock, CreateCategoryInput,
    CreatePermissionInput, CreateRoleInput, GrantRepository, ManagementEdgeRepository,
    PermissionRepository, RoleChangeEntry, RoleChangeEvent, RoleDependents, RoleHistoryQuery,
    RoleRepository, TransactionMode, UserRoleRepository,
};

#[derive(Clone, Default)]
struct FakeState {
    roles: Vec<Role>,
    categories: Vec<PermissionCategory>,
    permissions: Vec<Permission>,
    grants: Vec<RoleGrant>,
    edges: Vec<ManagementEdge>,
    assignments: Vec<UserRoleAssignment>,
    role_changes: Vec<RoleChangeEntry>,
    actions: Vec<ActionLogEntry>,
}

/// Store fake with rollback on drop: writers edit a copy that replaces the
/// shared state only on commit.
#[derive(Clone, Default)]
pub(crate) struct FakeAccessControlStore {
    state: Arc<Mutex<FakeState>>,
    fail_audit_writes: bool,
}

impl FakeAccessControlStore {
    pub(crate) fn with_failing_audit_writes() -> Self {
        Self {
            state: Arc::default(),
            fail_audit_writes: true,
        }
    }
}

#[async_trait]
impl AccessControlStore for FakeAccessControlStore {
    async fn begin(&self, mode: TransactionMode) -> AppResult<Box<dyn AccessControlTransaction>> {
        let transaction = match mode {
            TransactionMode::ReadOnly => FakeTransaction {
                state: self.state.lock().await.clone(),
                guard: None,
                fail_audit_writes: self.fail_audit_writes,
            },
            TransactionMode::ReadWrite => {
                let guard = Arc::clone(&self.state).lock_owned().await;
                FakeTransaction {
                    state: guard.clone(),
                    guard: Some(guard),
                    fail_audit_writes: self.fail_audit_writes,
                }
            }
        };

        Ok(Box::new(transaction))
    }
}

struct FakeTransaction {
    state: FakeState,
    guard: Option<OwnedMutexGuard<FakeState>>,
    fail_audit_writes: bool,
}

impl FakeTransaction {
    fn writable(&mut self) -> AppResult<&mut FakeState> {
        match self.guard {
            Some(_) => Ok(&mut self.state),
            None => Err(AppError::Persistence(
                "read-only transaction".to_owned(),
            )),
        }
    }

    fn audit_writable(&mut self) -> AppResult<&mut FakeState> {
        if self.fail_audit_writes {
            return Err(AppError::Persistence("audit storage is down".to_owned()));
        }

        self.writable()
    }
}

fn entry_id(length: usize) -> i64 {
    i64::try_from(length).unwrap_or(i64::MAX) + 1
}

fn count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl AccessControlTransaction for FakeTransaction {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        let Self { state, guard, .. } = *self;
        if let Some(mut guard) = guard {
            *guard = state;
        }

        Ok(())
    }
}

#[async_trait]
impl RoleRepository for FakeTransaction {
    async fn find_role(&mut self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .roles
            .iter()
            .find(|role| role.id() == role_id)
            .cloned())
    }

    async fn lock_role(&mut self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.find_role(role_id).await
    }

    async fn list_roles(&mut self) -> AppResult<Vec<Role>> {
        let mut roles = self.state.roles.clone();
        roles.sort_by(|left, right| {
            right
                .level()
                .cmp(&left.level())
                .then_with(|| left.name().as_str().cmp(right.name().as_str()))
        });
        Ok(roles)
    }

    async fn list_child_roles(&mut self, parent_id: RoleId) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> = self
            .state
            .roles
            .iter()
            .filter(|role| role.parent_id() == Some(parent_id))
            .cloned()
            .collect();
        roles.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(roles)
    }

    async fn insert_role(&mut self, role: &Role) -> AppResult<()> {
        self.writable()?.roles.push(role.clone());
        Ok(())
    }

    async fn update_role(&mut self, role: &Role) -> AppResult<()> {
        let state = self.writable()?;
        match state.roles.iter_mut().find(|stored| stored.id() == role.id()) {
            Some(stored) => {
                *stored = role.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("role '{}'", role.id()))),
        }
    }

    async fn delete_role(&mut self, role_id: RoleId) -> AppResult<()> {
        self.writable()?.roles.retain(|role| role.id() != role_id);
        Ok(())
    }

    async fn count_role_dependents(&mut self, role_id: RoleId) -> AppResult<RoleDependents> {
        let state = &self.state;
        Ok(RoleDependents {
            children: count(
                state
                    .roles
                    .iter()
                    .filter(|role| role.parent_id() == Some(role_id))
                    .count(),
            ),
            grants: count(
                state
                    .grants
                    .iter()
                    .filter(|grant| grant.role_id == role_id)
                    .count(),
            ),
            management_edges: count(
                state
                    .edges
                    .iter()
                    .filter(|edge| {
                        edge.manager_role_id() == role_id || edge.manageable_role_id() == role_id
                    })
                    .count(),
            ),
            assignments: count(
                state
                    .assignments
                    .iter()
                    .filter(|assignment| assignment.role_id == role_id)
                    .count(),
            ),
        })
    }
}

#[async_trait]
impl PermissionRepository for FakeTransaction {
    async fn insert_category(&mut self, category: &PermissionCategory) -> AppResult<()> {
        self.writable()?.categories.push(category.clone());
        Ok(())
    }

    async fn find_category(
        &mut self,
        category_id: PermissionCategoryId,
    ) -> AppResult<Option<PermissionCategory>> {
        Ok(self
            .state
            .categories
            .iter()
            .find(|category| category.id() == category_id)
            .cloned())
    }

    async fn list_categories(&mut self) -> AppResult<Vec<PermissionCategory>> {
        let mut categories = self.state.categories.clone();
        categories.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(categories)
    }

    async fn insert_permission(&mut self, permission: &Permission) -> AppResult<()> {
        let state = self.writable()?;
        if state
            .permissions
            .iter()
            .any(|stored| stored.code() == permission.code())
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.code()
            )));
        }

        state.permissions.push(permission.clone());
        Ok(())
    }

    async fn find_permission(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .permissions
            .iter()
            .find(|permission| permission.id() == permission_id)
            .cloned())
    }

    async fn find_permission_by_code(
        &mut self,
        code: &PermissionCode,
    ) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .permissions
            .iter()
            .find(|permission| permission.code() == code)
            .cloned())
    }

    async fn list_permissions_by_category(
        &mut self,
        category_id: PermissionCategoryId,
    ) -> AppResult<Vec<Permission>> {
        let mut permissions: Vec<Permission> = self
            .state
            .permissions
            .iter()
            .filter(|permission| permission.category_id() == category_id)
            .cloned()
            .collect();
        permissions.sort_by(|left, right| left.code().cmp(right.code()));
        Ok(permissions)
    }
}

#[async_trait]
impl GrantRepository for FakeTransaction {
    async fn find_grant(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<Option<RoleGrant>> {
        Ok(self
            .state
            .grants
            .iter()
            .find(|grant| grant.role_id == role_id && grant.permission_id == permission_id)
            .cloned())
    }

    async fn insert_grant(&mut self, grant: &RoleGrant) -> AppResult<()> {
        self.writable()?.grants.push(grant.clone());
        Ok(())
    }

    async fn delete_grant(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let state = self.writable()?;
        let before = state.grants.len();
        state
            .grants
            .retain(|grant| !(grant.role_id == role_id && grant.permission_id == permission_id));
        Ok(state.grants.len() < before)
    }

    async fn list_permissions_for_role(&mut self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        let state = &self.state;
        let mut permissions: Vec<Permission> = state
            .grants
            .iter()
            .filter(|grant| grant.role_id == role_id)
            .filter_map(|grant| {
                state
                    .permissions
                    .iter()
                    .find(|permission| permission.id() == grant.permission_id)
                    .cloned()
            })
            .collect();
        permissions.sort_by(|left, right| left.code().cmp(right.code()));
        Ok(permissions)
    }
}

#[async_trait]
impl ManagementEdgeRepository for FakeTransaction {
    async fn find_edge(
        &mut self,
        manager_role_id: RoleId,
        manageable_role_id: RoleId,
    ) -> AppResult<Option<ManagementEdge>> {
        Ok(self
            .state
            .edges
            .iter()
            .find(|edge| {
                edge.manager_role_id() == manager_role_id
                    && edge.manageable_role_id() == manageable_role_id
            })
            .cloned())
    }

    async fn insert_edge(&mut self, edge: &ManagementEdge) -> AppResult<()> {
        self.writable()?.edges.push(edge.clone());
        Ok(())
    }

    async fn delete_edge(
        &mut self,
        manager_role_id: RoleId,
        manageable_role_id: RoleId,
    ) -> AppResult<bool> {
        let state = self.writable()?;
        let before = state.edges.len();
        state.edges.retain(|edge| {
            !(edge.manager_role_id() == manager_role_id
                && edge.manageable_role_id() == manageable_role_id)
        });
        Ok(state.edges.len() < before)
    }

    async fn list_edges_from(
        &mut self,
        manager_role_id: RoleId,
    ) -> AppResult<Vec<ManagementEdge>> {
        Ok(self
            .state
            .edges
            .iter()
            .filter(|edge| edge.manager_role_id() == manager_role_id)
            .cloned()
            .collect())
    }

    async fn has_edge_from_any(
        &mut self,
        manager_role_ids: &[RoleId],
        manageable_role_id: RoleId,
    ) -> AppResult<bool> {
        Ok(self.state.edges.iter().any(|edge| {
            edge.manageable_role_id() == manageable_role_id
                && manager_role_ids.contains(&edge.manager_role_id())
        }))
    }
}

#[async_trait]
impl UserRoleRepository for FakeTransaction {
    async fn find_assignment(
        &mut self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<Option<UserRoleAssignment>> {
        Ok(self
            .state
            .assignments
            .iter()
            .find(|assignment| assignment.user_id == user_id && assignment.role_id == role_id)
            .cloned())
    }

    async fn insert_assignment(&mut self, assignment: &UserRoleAssignment) -> AppResult<()> {
        self.writable()?.assignments.push(assignment.clone());
        Ok(())
    }

    async fn delete_assignment(&mut self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        let state = self.writable()?;
        let before = state.assignments.len();
        state
            .assignments
            .retain(|assignment| !(assignment.user_id == user_id && assignment.role_id == role_id));
        Ok(state.assignments.len() < before)
    }

    async fn list_role_ids_for_user(&mut self, user_id: UserId) -> AppResult<Vec<RoleId>> {
        Ok(self
            .state
            .assignments
            .iter()
            .filter(|assignment| assignment.user_id == user_id)
            .map(|assignment| assignment.role_id)
            .collect())
    }
}

#[async_trait]
impl AuditTrailRepository for FakeTransaction {
    async fn append_role_change(&mut self, event: RoleChangeEvent) -> AppResult<()> {
        let state = self.audit_writable()?;
        state.role_changes.push(RoleChangeEntry {
            entry_id: entry_id(state.role_changes.len()),
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
        let state = self.audit_writable()?;
        state.actions.push(ActionLogEntry {
            entry_id: entry_id(state.actions.len()),
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
            .filter(|entry| query.action.as_ref().is_none_or(|action| &entry.action == action))
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

struct FakeClock;

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }
}

/// Wired services plus an acting user.
pub(crate) struct Fixture {
    pub(crate) services: AccessControlServices,
    pub(crate) actor: ActorIdentity,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::with_store(FakeAccessControlStore::default())
    }

    pub(crate) fn with_store(store: FakeAccessControlStore) -> Self {
        Self {
            services: AccessControlServices::new(Arc::new(store), Arc::new(FakeClock)),
            actor: ActorIdentity::new(UserId::new(), "Records Admin")
                .with_origin("10.0.0.7")
                .with_client("precinct-tests"),
        }
    }

    pub(crate) async fn role(&self, name: &str, level: i32, parent_id: Option<RoleId>) -> Role {
        self.services
            .role_graph
            .create_role(
                &self.actor,
                CreateRoleInput {
                    name: name.to_owned(),
                    description: String::new(),
                    level: Some(level),
                    parent_id,
                    is_system: false,
                },
            )
            .await
            .unwrap_or_else(|_| unreachable!())
    }

    pub(crate) async fn category(&self, name: &str) -> PermissionCategory {
        self.services
            .permission_registry
            .create_category(
                &self.actor,
                CreateCategoryInput {
                    name: name.to_owned(),
                    description: String::new(),
                },
            )
            .await
            .unwrap_or_else(|_| unreachable!())
    }

    pub(crate) async fn permission(&self, category: &PermissionCategory, code: &str) -> Permission {
        self.services
            .permission_registry
            .create_permission(
                &self.actor,
                CreatePermissionInput {
                    category_id: category.id(),
                    code: code.to_owned(),
                    name: code.to_owned(),
                    description: String::new(),
                },
            )
            .await
            .unwrap_or_else(|_| unreachable!())
    }

    pub(crate) async fn grant(&self, role: &Role, permission: &Permission) {
        let granted = self
            .services
            .grants
            .grant(&self.actor, role.id(), permission.id())
            .await;
        assert!(granted.is_ok());
    }

    pub(crate) async fn edge(&self, manager: &Role, manageable: &Role) {
        let added = self
            .services
            .management_policy
            .add_edge(&self.actor, manager.id(), manageable.id())
            .await;
        assert!(added.is_ok());
    }
}
