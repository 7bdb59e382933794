use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use precinct_application::GrantRepository;
use precinct_core::{AppResult, UserId};
use precinct_domain::{Permission, PermissionId, RoleGrant, RoleId};

use super::permissions::PermissionRow;
use super::{PostgresAccessControlTransaction, map_write_error, persistence_error};

#[derive(Debug, FromRow)]
struct GrantRow {
    role_id: Uuid,
    permission_id: Uuid,
    granted_by: Option<Uuid>,
    granted_at: DateTime<Utc>,
}

#[async_trait]
impl GrantRepository for PostgresAccessControlTransaction {
    async fn find_grant(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<Option<RoleGrant>> {
        let row = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT role_id, permission_id, granted_by, granted_at
            FROM role_permissions
            WHERE role_id = $1 AND permission_id = $2
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(permission_id.as_uuid())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(persistence_error("find grant"))?;

        Ok(row.map(|row| RoleGrant {
            role_id: RoleId::from_uuid(row.role_id),
            permission_id: PermissionId::from_uuid(row.permission_id),
            granted_by: row.granted_by.map(UserId::from_uuid),
            granted_at: row.granted_at,
        }))
    }

    async fn insert_grant(&mut self, grant: &RoleGrant) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id, granted_by, granted_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(grant.role_id.as_uuid())
        .bind(grant.permission_id.as_uuid())
        .bind(grant.granted_by.map(|user_id| user_id.as_uuid()))
        .bind(grant.granted_at)
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            map_write_error(error, "insert grant", || {
                format!(
                    "role '{}' already holds permission '{}'",
                    grant.role_id, grant.permission_id
                )
            })
        })?;

        Ok(())
    }

    async fn delete_grant(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE role_id = $1 AND permission_id = $2
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(permission_id.as_uuid())
        .execute(&mut *self.transaction)
        .await
        .map_err(persistence_error("delete grant"))?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn list_permissions_for_role(&mut self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permissions.id, permissions.category_id, permissions.code,
                   permissions.name, permissions.description
            FROM role_permissions
            INNER JOIN permissions
                ON permissions.id = role_permissions.permission_id
            WHERE role_permissions.role_id = $1
            ORDER BY permissions.code
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(persistence_error("list role permissions"))?
        .into_iter()
        .map(PermissionRow::into_permission)
        .collect()
    }
}
