use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use precinct_application::ManagementEdgeRepository;
use precinct_core::{AppError, AppResult, UserId};
use precinct_domain::{ManagementEdge, RoleId};

use super::{PostgresAccessControlTransaction, map_write_error, persistence_error};

#[derive(Debug, FromRow)]
struct EdgeRow {
    manager_role_id: Uuid,
    manageable_role_id: Uuid,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl EdgeRow {
    fn into_edge(self) -> AppResult<ManagementEdge> {
        ManagementEdge::new(
            RoleId::from_uuid(self.manager_role_id),
            RoleId::from_uuid(self.manageable_role_id),
            self.created_by.map(UserId::from_uuid),
            self.created_at,
        )
        .map_err(|error| AppError::Internal(format!("invalid stored management edge: {error}")))
    }
}

#[async_trait]
impl ManagementEdgeRepository for PostgresAccessControlTransaction {
    async fn find_edge(
        &mut self,
        manager_role_id: RoleId,
        manageable_role_id: RoleId,
    ) -> AppResult<Option<ManagementEdge>> {
        sqlx::query_as::<_, EdgeRow>(
            r#"
            SELECT manager_role_id, manageable_role_id, created_by, created_at
            FROM role_management_edges
            WHERE manager_role_id = $1 AND manageable_role_id = $2
            "#,
        )
        .bind(manager_role_id.as_uuid())
        .bind(manageable_role_id.as_uuid())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(persistence_error("find management edge"))?
        .map(EdgeRow::into_edge)
        .transpose()
    }

    async fn insert_edge(&mut self, edge: &ManagementEdge) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role_management_edges (
                manager_role_id, manageable_role_id, created_by, created_at
            )
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(edge.manager_role_id().as_uuid())
        .bind(edge.manageable_role_id().as_uuid())
        .bind(edge.created_by().map(|user_id| user_id.as_uuid()))
        .bind(edge.created_at())
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            map_write_error(error, "insert management edge", || {
                format!(
                    "role '{}' already manages role '{}'",
                    edge.manager_role_id(),
                    edge.manageable_role_id()
                )
            })
        })?;

        Ok(())
    }

    async fn delete_edge(
        &mut self,
        manager_role_id: RoleId,
        manageable_role_id: RoleId,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM role_management_edges
            WHERE manager_role_id = $1 AND manageable_role_id = $2
            "#,
        )
        .bind(manager_role_id.as_uuid())
        .bind(manageable_role_id.as_uuid())
        .execute(&mut *self.transaction)
        .await
        .map_err(persistence_error("delete management edge"))?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn list_edges_from(
        &mut self,
        manager_role_id: RoleId,
    ) -> AppResult<Vec<ManagementEdge>> {
        sqlx::query_as::<_, EdgeRow>(
            r#"
            SELECT manager_role_id, manageable_role_id, created_by, created_at
            FROM role_management_edges
            WHERE manager_role_id = $1
            ORDER BY created_at, manageable_role_id
            "#,
        )
        .bind(manager_role_id.as_uuid())
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(persistence_error("list management edges"))?
        .into_iter()
        .map(EdgeRow::into_edge)
        .collect()
    }

    async fn has_edge_from_any(
        &mut self,
        manager_role_ids: &[RoleId],
        manageable_role_id: RoleId,
    ) -> AppResult<bool> {
        let manager_role_ids: Vec<Uuid> = manager_role_ids
            .iter()
            .map(|role_id| role_id.as_uuid())
            .collect();

        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM role_management_edges
                WHERE manager_role_id = ANY($1)
                    AND manageable_role_id = $2
            )
            "#,
        )
        .bind(manager_role_ids)
        .bind(manageable_role_id.as_uuid())
        .fetch_one(&mut *self.transaction)
        .await
        .map_err(persistence_error("evaluate management edges"))
    }
}
