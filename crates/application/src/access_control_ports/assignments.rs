use async_trait::async_trait;
use precinct_core::{AppResult, UserId};
use precinct_domain::{RoleId, UserRoleAssignment};

/// User role assignment persistence within a unit of work.
#[async_trait]
pub trait UserRoleRepository: Send {
    /// Looks up one assignment.
    async fn find_assignment(
        &mut self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<Option<UserRoleAssignment>>;

    /// Inserts an assignment. Duplicate pairs are reported as conflicts.
    async fn insert_assignment(&mut self, assignment: &UserRoleAssignment) -> AppResult<()>;

    /// Deletes an assignment and returns whether a row was removed.
    async fn delete_assignment(&mut self, user_id: UserId, role_id: RoleId) -> AppResult<bool>;

    /// Lists the roles held by a user.
    async fn list_role_ids_for_user(&mut self, user_id: UserId) -> AppResult<Vec<RoleId>>;
}
