use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use precinct_application::PermissionRepository;
use precinct_core::{AppError, AppResult};
use precinct_domain::{
    Permission, PermissionCategory, PermissionCategoryId, PermissionCode, PermissionId,
};

use super::{PostgresAccessControlTransaction, map_write_error, persistence_error};

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: String,
}

impl CategoryRow {
    fn into_category(self) -> AppResult<PermissionCategory> {
        let category_id = self.id;
        PermissionCategory::new(
            PermissionCategoryId::from_uuid(self.id),
            self.name,
            self.description,
        )
        .map_err(|error| {
            AppError::Internal(format!(
                "invalid stored permission category '{category_id}': {error}"
            ))
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct PermissionRow {
    id: Uuid,
    category_id: Uuid,
    code: String,
    name: String,
    description: String,
}

impl PermissionRow {
    pub(super) fn into_permission(self) -> AppResult<Permission> {
        let permission_id = self.id;
        Permission::new(
            PermissionId::from_uuid(self.id),
            PermissionCategoryId::from_uuid(self.category_id),
            self.code,
            self.name,
            self.description,
        )
        .map_err(|error| {
            AppError::Internal(format!(
                "invalid stored permission '{permission_id}': {error}"
            ))
        })
    }
}

#[async_trait]
impl PermissionRepository for PostgresAccessControlTransaction {
    async fn insert_category(&mut self, category: &PermissionCategory) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO permission_categories (id, name, description)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(category.id().as_uuid())
        .bind(category.name().as_str())
        .bind(category.description())
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            map_write_error(error, "insert permission category", || {
                format!("permission category '{}' already exists", category.id())
            })
        })?;

        Ok(())
    }

    async fn find_category(
        &mut self,
        category_id: PermissionCategoryId,
    ) -> AppResult<Option<PermissionCategory>> {
        sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, description
            FROM permission_categories
            WHERE id = $1
            "#,
        )
        .bind(category_id.as_uuid())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(persistence_error("find permission category"))?
        .map(CategoryRow::into_category)
        .transpose()
    }

    async fn list_categories(&mut self) -> AppResult<Vec<PermissionCategory>> {
        sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, description
            FROM permission_categories
            ORDER BY name, id
            "#,
        )
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(persistence_error("list permission categories"))?
        .into_iter()
        .map(CategoryRow::into_category)
        .collect()
    }

    async fn insert_permission(&mut self, permission: &Permission) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO permissions (id, category_id, code, name, description)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(permission.id().as_uuid())
        .bind(permission.category_id().as_uuid())
        .bind(permission.code().as_str())
        .bind(permission.name().as_str())
        .bind(permission.description())
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            map_write_error(error, "insert permission", || {
                format!("permission '{}' already exists", permission.code())
            })
        })?;

        Ok(())
    }

    async fn find_permission(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, category_id, code, name, description
            FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(persistence_error("find permission"))?
        .map(PermissionRow::into_permission)
        .transpose()
    }

    async fn find_permission_by_code(
        &mut self,
        code: &PermissionCode,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, category_id, code, name, description
            FROM permissions
            WHERE code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(persistence_error("find permission by code"))?
        .map(PermissionRow::into_permission)
        .transpose()
    }

    async fn list_permissions_by_category(
        &mut self,
        category_id: PermissionCategoryId,
    ) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, category_id, code, name, description
            FROM permissions
            WHERE category_id = $1
            ORDER BY code
            "#,
        )
        .bind(category_id.as_uuid())
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(persistence_error("list permissions by category"))?
        .into_iter()
        .map(PermissionRow::into_permission)
        .collect()
    }
}
