use async_trait::async_trait;
use precinct_core::AppResult;
use precinct_domain::{Permission, PermissionId, RoleGrant, RoleId};

/// Role grant persistence within a unit of work.
#[async_trait]
pub trait GrantRepository: Send {
    /// Looks up the grant for a role and permission pair.
    async fn find_grant(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<Option<RoleGrant>>;

    /// Inserts a grant. Duplicate pairs are reported as conflicts.
    async fn insert_grant(&mut self, grant: &RoleGrant) -> AppResult<()>;

    /// Deletes a grant and returns whether a row was removed.
    async fn delete_grant(&mut self, role_id: RoleId, permission_id: PermissionId)
    -> AppResult<bool>;

    /// Lists permissions granted directly to a role, ordered by code.
    async fn list_permissions_for_role(&mut self, role_id: RoleId) -> AppResult<Vec<Permission>>;
}
