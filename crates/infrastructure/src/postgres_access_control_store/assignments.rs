use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use precinct_application::UserRoleRepository;
use precinct_core::{AppResult, UserId};
use precinct_domain::{RoleId, UserRoleAssignment};

use super::{PostgresAccessControlTransaction, map_write_error, persistence_error};

#[derive(Debug, FromRow)]
struct AssignmentRow {
    user_id: Uuid,
    role_id: Uuid,
    assigned_by: Option<Uuid>,
    assigned_at: DateTime<Utc>,
}

#[async_trait]
impl UserRoleRepository for PostgresAccessControlTransaction {
    async fn find_assignment(
        &mut self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<Option<UserRoleAssignment>> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT user_id, role_id, assigned_by, assigned_at
            FROM user_roles
            WHERE user_id = $1 AND role_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(persistence_error("find user role"))?;

        Ok(row.map(|row| UserRoleAssignment {
            user_id: UserId::from_uuid(row.user_id),
            role_id: RoleId::from_uuid(row.role_id),
            assigned_by: row.assigned_by.map(UserId::from_uuid),
            assigned_at: row.assigned_at,
        }))
    }

    async fn insert_assignment(&mut self, assignment: &UserRoleAssignment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id, assigned_by, assigned_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(assignment.user_id.as_uuid())
        .bind(assignment.role_id.as_uuid())
        .bind(assignment.assigned_by.map(|user_id| user_id.as_uuid()))
        .bind(assignment.assigned_at)
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            map_write_error(error, "assign role", || {
                format!(
                    "user '{}' already holds role '{}'",
                    assignment.user_id, assignment.role_id
                )
            })
        })?;

        Ok(())
    }

    async fn delete_assignment(&mut self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = $1 AND role_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&mut *self.transaction)
        .await
        .map_err(persistence_error("remove user role"))?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn list_role_ids_for_user(&mut self, user_id: UserId) -> AppResult<Vec<RoleId>> {
        let role_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT role_id
            FROM user_roles
            WHERE user_id = $1
            ORDER BY assigned_at, role_id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(persistence_error("list user roles"))?;

        Ok(role_ids.into_iter().map(RoleId::from_uuid).collect())
    }
}
