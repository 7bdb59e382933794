use async_trait::async_trait;

use precinct_application::{RoleDependents, RoleRepository};
use precinct_core::{AppError, AppResult};
use precinct_domain::{Role, RoleId};

use super::InMemoryAccessControlTransaction;

fn count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn sort_by_name(roles: &mut [Role]) {
    roles.sort_by(|left, right| {
        left.name()
            .as_str()
            .cmp(right.name().as_str())
            .then_with(|| left.id().cmp(&right.id()))
    });
}

#[async_trait]
impl RoleRepository for InMemoryAccessControlTransaction {
    async fn find_role(&mut self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.roles.get(&role_id).cloned())
    }

    async fn lock_role(&mut self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.roles.get(&role_id).cloned())
    }

    async fn list_roles(&mut self) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> = self.state.roles.values().cloned().collect();
        sort_by_name(&mut roles);
        roles.sort_by(|left, right| right.level().cmp(&left.level()));
        Ok(roles)
    }

    async fn list_child_roles(&mut self, parent_id: RoleId) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> = self
            .state
            .roles
            .values()
            .filter(|role| role.parent_id() == Some(parent_id))
            .cloned()
            .collect();
        sort_by_name(&mut roles);
        Ok(roles)
    }

    async fn insert_role(&mut self, role: &Role) -> AppResult<()> {
        let state = self.writable()?;
        if state.roles.contains_key(&role.id()) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.id()
            )));
        }
        if let Some(parent_id) = role.parent_id()
            && !state.roles.contains_key(&parent_id)
        {
            return Err(AppError::Persistence(format!(
                "parent role '{parent_id}' does not exist"
            )));
        }

        state.roles.insert(role.id(), role.clone());
        Ok(())
    }

    async fn update_role(&mut self, role: &Role) -> AppResult<()> {
        let state = self.writable()?;
        let stored = state
            .roles
            .get_mut(&role.id())
            .ok_or_else(|| AppError::NotFound(format!("role '{}' was not found", role.id())))?;

        *stored = role.clone();
        Ok(())
    }

    async fn delete_role(&mut self, role_id: RoleId) -> AppResult<()> {
        let state = self.writable()?;
        if state.roles.remove(&role_id).is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        Ok(())
    }

    async fn count_role_dependents(&mut self, role_id: RoleId) -> AppResult<RoleDependents> {
        let state = &self.state;

        Ok(RoleDependents {
            children: count(
                state
                    .roles
                    .values()
                    .filter(|role| role.parent_id() == Some(role_id))
                    .count(),
            ),
            grants: count(
                state
                    .grants
                    .keys()
                    .filter(|(granted_role_id, _)| *granted_role_id == role_id)
                    .count(),
            ),
            management_edges: count(
                state
                    .edges
                    .keys()
                    .filter(|(manager, manageable)| *manager == role_id || *manageable == role_id)
                    .count(),
            ),
            assignments: count(
                state
                    .assignments
                    .keys()
                    .filter(|(_, assigned_role_id)| *assigned_role_id == role_id)
                    .count(),
            ),
        })
    }
}
