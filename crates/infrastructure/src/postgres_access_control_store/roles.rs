use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use precinct_application::{RoleDependents, RoleRepository};
use precinct_core::{AppError, AppResult, UserId};
use precinct_domain::{Role, RoleId, RoleParts};

use super::{PostgresAccessControlTransaction, persistence_error, map_write_error};

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
    description: String,
    parent_id: Option<Uuid>,
    level: i32,
    is_system: bool,
    created_by: Option<Uuid>,
    updated_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRow {
    fn into_role(self) -> AppResult<Role> {
        let role_id = self.id;
        Role::from_parts(RoleParts {
            id: RoleId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            parent_id: self.parent_id.map(RoleId::from_uuid),
            level: self.level,
            is_system: self.is_system,
            created_by: self.created_by.map(UserId::from_uuid),
            updated_by: self.updated_by.map(UserId::from_uuid),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
        .map_err(|error| AppError::Internal(format!("invalid stored role '{role_id}': {error}")))
    }
}

#[derive(Debug, FromRow)]
struct RoleDependentsRow {
    children: i64,
    grants: i64,
    management_edges: i64,
    assignments: i64,
}

fn into_roles(rows: Vec<RoleRow>) -> AppResult<Vec<Role>> {
    rows.into_iter().map(RoleRow::into_role).collect()
}

#[async_trait]
impl RoleRepository for PostgresAccessControlTransaction {
    async fn find_role(&mut self, role_id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, parent_id, level, is_system,
                   created_by, updated_by, created_at, updated_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(persistence_error("find role"))?
        .map(RoleRow::into_role)
        .transpose()
    }

    async fn lock_role(&mut self, role_id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, parent_id, level, is_system,
                   created_by, updated_by, created_at, updated_at
            FROM roles
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(persistence_error("lock role"))?
        .map(RoleRow::into_role)
        .transpose()
    }

    async fn list_roles(&mut self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, parent_id, level, is_system,
                   created_by, updated_by, created_at, updated_at
            FROM roles
            ORDER BY level DESC, name, id
            "#,
        )
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(persistence_error("list roles"))?;

        into_roles(rows)
    }

    async fn list_child_roles(&mut self, parent_id: RoleId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, parent_id, level, is_system,
                   created_by, updated_by, created_at, updated_at
            FROM roles
            WHERE parent_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(parent_id.as_uuid())
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(persistence_error("list child roles"))?;

        into_roles(rows)
    }

    async fn insert_role(&mut self, role: &Role) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO roles (
                id, name, description, parent_id, level, is_system,
                created_by, updated_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .bind(role.description())
        .bind(role.parent_id().map(|parent_id| parent_id.as_uuid()))
        .bind(role.level())
        .bind(role.is_system())
        .bind(role.created_by().map(|user_id| user_id.as_uuid()))
        .bind(role.updated_by().map(|user_id| user_id.as_uuid()))
        .bind(role.created_at())
        .bind(role.updated_at())
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            map_write_error(error, "insert role", || {
                format!("role '{}' already exists", role.id())
            })
        })?;

        Ok(())
    }

    async fn update_role(&mut self, role: &Role) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE roles
            SET name = $2,
                description = $3,
                parent_id = $4,
                level = $5,
                updated_by = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .bind(role.description())
        .bind(role.parent_id().map(|parent_id| parent_id.as_uuid()))
        .bind(role.level())
        .bind(role.updated_by().map(|user_id| user_id.as_uuid()))
        .bind(role.updated_at())
        .execute(&mut *self.transaction)
        .await
        .map_err(persistence_error("update role"))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.id()
            )));
        }

        Ok(())
    }

    async fn delete_role(&mut self, role_id: RoleId) -> AppResult<()> {
        let rows_affected = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(role_id.as_uuid())
            .execute(&mut *self.transaction)
            .await
            .map_err(persistence_error("delete role"))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        Ok(())
    }

    async fn count_role_dependents(&mut self, role_id: RoleId) -> AppResult<RoleDependents> {
        let row = sqlx::query_as::<_, RoleDependentsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM roles WHERE parent_id = $1) AS children,
                (SELECT COUNT(*) FROM role_permissions WHERE role_id = $1) AS grants,
                (
                    SELECT COUNT(*)
                    FROM role_management_edges
                    WHERE manager_role_id = $1 OR manageable_role_id = $1
                ) AS management_edges,
                (SELECT COUNT(*) FROM user_roles WHERE role_id = $1) AS assignments
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_one(&mut *self.transaction)
        .await
        .map_err(persistence_error("count role dependents"))?;

        Ok(RoleDependents {
            children: row.children,
            grants: row.grants,
            management_edges: row.management_edges,
            assignments: row.assignments,
        })
    }
}
