use async_trait::async_trait;

use precinct_application::PermissionRepository;
use precinct_core::{AppError, AppResult};
use precinct_domain::{
    Permission, PermissionCategory, PermissionCategoryId, PermissionCode, PermissionId,
};

use super::InMemoryAccessControlTransaction;

#[async_trait]
impl PermissionRepository for InMemoryAccessControlTransaction {
    async fn insert_category(&mut self, category: &PermissionCategory) -> AppResult<()> {
        let state = self.writable()?;
        if state.categories.contains_key(&category.id()) {
            return Err(AppError::Conflict(format!(
                "permission category '{}' already exists",
                category.id()
            )));
        }

        state.categories.insert(category.id(), category.clone());
        Ok(())
    }

    async fn find_category(
        &mut self,
        category_id: PermissionCategoryId,
    ) -> AppResult<Option<PermissionCategory>> {
        Ok(self.state.categories.get(&category_id).cloned())
    }

    async fn list_categories(&mut self) -> AppResult<Vec<PermissionCategory>> {
        let mut categories: Vec<PermissionCategory> =
            self.state.categories.values().cloned().collect();
        categories.sort_by(|left, right| {
            left.name()
                .as_str()
                .cmp(right.name().as_str())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(categories)
    }

    async fn insert_permission(&mut self, permission: &Permission) -> AppResult<()> {
        let state = self.writable()?;
        if state
            .permissions
            .values()
            .any(|stored| stored.code() == permission.code())
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.code()
            )));
        }
        if !state.categories.contains_key(&permission.category_id()) {
            return Err(AppError::Persistence(format!(
                "permission category '{}' does not exist",
                permission.category_id()
            )));
        }

        state.permissions.insert(permission.id(), permission.clone());
        Ok(())
    }

    async fn find_permission(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        Ok(self.state.permissions.get(&permission_id).cloned())
    }

    async fn find_permission_by_code(
        &mut self,
        code: &PermissionCode,
    ) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .permissions
            .values()
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
            .values()
            .filter(|permission| permission.category_id() == category_id)
            .cloned()
            .collect();
        permissions.sort_by(|left, right| left.code().cmp(right.code()));
        Ok(permissions)
    }
}
