use async_trait::async_trait;

use precinct_application::GrantRepository;
use precinct_core::{AppError, AppResult};
use precinct_domain::{Permission, PermissionId, RoleGrant, RoleId};

use super::InMemoryAccessControlTransaction;

#[async_trait]
impl GrantRepository for InMemoryAccessControlTransaction {
    async fn find_grant(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<Option<RoleGrant>> {
        Ok(self.state.grants.get(&(role_id, permission_id)).cloned())
    }

    async fn insert_grant(&mut self, grant: &RoleGrant) -> AppResult<()> {
        let state = self.writable()?;
        let key = (grant.role_id, grant.permission_id);
        if state.grants.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "role '{}' already holds permission '{}'",
                grant.role_id, grant.permission_id
            )));
        }

        state.grants.insert(key, grant.clone());
        Ok(())
    }

    async fn delete_grant(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let state = self.writable()?;
        Ok(state.grants.remove(&(role_id, permission_id)).is_some())
    }

    async fn list_permissions_for_role(&mut self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        let mut permissions: Vec<Permission> = self
            .state
            .grants
            .keys()
            .filter(|(granted_role_id, _)| *granted_role_id == role_id)
            .filter_map(|(_, permission_id)| self.state.permissions.get(permission_id).cloned())
            .collect();
        permissions.sort_by(|left, right| left.code().cmp(right.code()));
        Ok(permissions)
    }
}
