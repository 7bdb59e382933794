use async_trait::async_trait;
use precinct_core::AppResult;
use precinct_domain::{
    Permission, PermissionCategory, PermissionCategoryId, PermissionCode, PermissionId,
};

/// Permission registry persistence within a unit of work.
#[async_trait]
pub trait PermissionRepository: Send {
    /// Inserts a permission category.
    async fn insert_category(&mut self, category: &PermissionCategory) -> AppResult<()>;

    /// Looks up a category by identifier.
    async fn find_category(
        &mut self,
        category_id: PermissionCategoryId,
    ) -> AppResult<Option<PermissionCategory>>;

    /// Lists categories ordered by name.
    async fn list_categories(&mut self) -> AppResult<Vec<PermissionCategory>>;

    /// Inserts a permission. Duplicate codes are reported as conflicts.
    async fn insert_permission(&mut self, permission: &Permission) -> AppResult<()>;

    /// Looks up a permission by identifier.
    async fn find_permission(&mut self, permission_id: PermissionId)
    -> AppResult<Option<Permission>>;

    /// Looks up a permission by its unique code.
    async fn find_permission_by_code(
        &mut self,
        code: &PermissionCode,
    ) -> AppResult<Option<Permission>>;

    /// Lists permissions of one category ordered by code.
    async fn list_permissions_by_category(
        &mut self,
        category_id: PermissionCategoryId,
    ) -> AppResult<Vec<Permission>>;
}
