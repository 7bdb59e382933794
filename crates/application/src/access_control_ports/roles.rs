use async_trait::async_trait;
use precinct_core::AppResult;
use precinct_domain::{Role, RoleId};

/// Counts of records that still reference a role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleDependents {
    /// Roles whose parent is this role.
    pub children: i64,
    /// Permission grants held by the role.
    pub grants: i64,
    /// Management edges in either direction.
    pub management_edges: i64,
    /// Users holding the role.
    pub assignments: i64,
}

impl RoleDependents {
    /// Returns whether nothing references the role.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children == 0
            && self.grants == 0
            && self.management_edges == 0
            && self.assignments == 0
    }
}

/// Role persistence within a unit of work.
#[async_trait]
pub trait RoleRepository: Send {
    /// Looks up a role by identifier.
    async fn find_role(&mut self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Looks up a role and holds a row lock on it until the transaction ends.
    async fn lock_role(&mut self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Lists all roles, most senior first.
    async fn list_roles(&mut self) -> AppResult<Vec<Role>>;

    /// Lists direct children of a role ordered by name.
    async fn list_child_roles(&mut self, parent_id: RoleId) -> AppResult<Vec<Role>>;

    /// Inserts a new role.
    async fn insert_role(&mut self, role: &Role) -> AppResult<()>;

    /// Overwrites the stored state of an existing role.
    async fn update_role(&mut self, role: &Role) -> AppResult<()>;

    /// Removes a role row.
    async fn delete_role(&mut self, role_id: RoleId) -> AppResult<()>;

    /// Counts rows that reference the role.
    async fn count_role_dependents(&mut self, role_id: RoleId) -> AppResult<RoleDependents>;
}
