use async_trait::async_trait;
use precinct_core::AppResult;
use precinct_domain::{ManagementEdge, RoleId};

/// Management edge persistence within a unit of work.
#[async_trait]
pub trait ManagementEdgeRepository: Send {
    /// Looks up a directed edge.
    async fn find_edge(
        &mut self,
        manager_role_id: RoleId,
        manageable_role_id: RoleId,
    ) -> AppResult<Option<ManagementEdge>>;

    /// Inserts an edge. Duplicate edges are reported as conflicts.
    async fn insert_edge(&mut self, edge: &ManagementEdge) -> AppResult<()>;

    /// Deletes an edge and returns whether a row was removed.
    async fn delete_edge(
        &mut self,
        manager_role_id: RoleId,
        manageable_role_id: RoleId,
    ) -> AppResult<bool>;

    /// Lists edges leaving a manager role.
    async fn list_edges_from(&mut self, manager_role_id: RoleId)
    -> AppResult<Vec<ManagementEdge>>;

    /// Returns whether any of the given roles has a direct edge to the target.
    async fn has_edge_from_any(
        &mut self,
        manager_role_ids: &[RoleId],
        manageable_role_id: RoleId,
    ) -> AppResult<bool>;
}
