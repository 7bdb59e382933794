use async_trait::async_trait;

use precinct_application::UserRoleRepository;
use precinct_core::{AppError, AppResult, UserId};
use precinct_domain::{RoleId, UserRoleAssignment};

use super::InMemoryAccessControlTransaction;

#[async_trait]
impl UserRoleRepository for InMemoryAccessControlTransaction {
    async fn find_assignment(
        &mut self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<Option<UserRoleAssignment>> {
        Ok(self.state.assignments.get(&(user_id, role_id)).cloned())
    }

    async fn insert_assignment(&mut self, assignment: &UserRoleAssignment) -> AppResult<()> {
        let state = self.writable()?;
        let key = (assignment.user_id, assignment.role_id);
        if state.assignments.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "user '{}' already holds role '{}'",
                key.0, key.1
            )));
        }

        state.assignments.insert(key, assignment.clone());
        Ok(())
    }

    async fn delete_assignment(&mut self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        let state = self.writable()?;
        Ok(state.assignments.remove(&(user_id, role_id)).is_some())
    }

    async fn list_role_ids_for_user(&mut self, user_id: UserId) -> AppResult<Vec<RoleId>> {
        let mut assignments: Vec<&UserRoleAssignment> = self
            .state
            .assignments
            .values()
            .filter(|assignment| assignment.user_id == user_id)
            .collect();
        assignments.sort_by_key(|assignment| (assignment.assigned_at, assignment.role_id));

        Ok(assignments
            .into_iter()
            .map(|assignment| assignment.role_id)
            .collect())
    }
}
