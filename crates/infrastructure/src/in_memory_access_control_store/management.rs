use async_trait::async_trait;

use precinct_application::ManagementEdgeRepository;
use precinct_core::{AppError, AppResult};
use precinct_domain::{ManagementEdge, RoleId};

use super::InMemoryAccessControlTransaction;

#[async_trait]
impl ManagementEdgeRepository for InMemoryAccessControlTransaction {
    async fn find_edge(
        &mut self,
        manager_role_id: RoleId,
        manageable_role_id: RoleId,
    ) -> AppResult<Option<ManagementEdge>> {
        Ok(self
            .state
            .edges
            .get(&(manager_role_id, manageable_role_id))
            .cloned())
    }

    async fn insert_edge(&mut self, edge: &ManagementEdge) -> AppResult<()> {
        let state = self.writable()?;
        let key = (edge.manager_role_id(), edge.manageable_role_id());
        if state.edges.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "role '{}' already manages role '{}'",
                key.0, key.1
            )));
        }

        state.edges.insert(key, edge.clone());
        Ok(())
    }

    async fn delete_edge(
        &mut self,
        manager_role_id: RoleId,
        manageable_role_id: RoleId,
    ) -> AppResult<bool> {
        let state = self.writable()?;
        Ok(state
            .edges
            .remove(&(manager_role_id, manageable_role_id))
            .is_some())
    }

    async fn list_edges_from(
        &mut self,
        manager_role_id: RoleId,
    ) -> AppResult<Vec<ManagementEdge>> {
        let mut edges: Vec<ManagementEdge> = self
            .state
            .edges
            .values()
            .filter(|edge| edge.manager_role_id() == manager_role_id)
            .cloned()
            .collect();
        edges.sort_by_key(|edge| (edge.created_at(), edge.manageable_role_id()));
        Ok(edges)
    }

    async fn has_edge_from_any(
        &mut self,
        manager_role_ids: &[RoleId],
        manageable_role_id: RoleId,
    ) -> AppResult<bool> {
        Ok(manager_role_ids.iter().any(|manager_role_id| {
            self.state
                .edges
                .contains_key(&(*manager_role_id, manageable_role_id))
        }))
    }
}
