use std::sync::Arc;

use precinct_core::{ActorIdentity, AppError, AppResult};
use precinct_domain::{
    AuditAction, Permission, PermissionCategory, PermissionCategoryId, PermissionCode,
    PermissionId,
};
use serde_json::json;
use tracing::info;

use crate::{
    AccessControlStore, AccessControlTransaction, ActionRecord, AuditTrailService,
    PermissionRepository, TransactionMode,
};

/// Input payload for creating a permission category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCategoryInput {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
}

/// Input payload for defining a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Owning category.
    pub category_id: PermissionCategoryId,
    /// Globally unique code such as `case.view`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
}

/// Catalog of permission categories and permission definitions.
#[derive(Clone)]
pub struct PermissionRegistryService {
    store: Arc<dyn AccessControlStore>,
    audit_trail: AuditTrailService,
}

impl PermissionRegistryService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(store: Arc<dyn AccessControlStore>, audit_trail: AuditTrailService) -> Self {
        Self { store, audit_trail }
    }

    /// Creates a permission category.
    pub async fn create_category(
        &self,
        actor: &ActorIdentity,
        input: CreateCategoryInput,
    ) -> AppResult<PermissionCategory> {
        let category =
            PermissionCategory::new(PermissionCategoryId::new(), input.name, input.description)?;

        let mut transaction = self.store.begin(TransactionMode::ReadWrite).await?;
        transaction.insert_category(&category).await?;
        self.audit_trail
            .record_action(
                transaction.as_mut(),
                Some(actor),
                ActionRecord::new(
                    AuditAction::PermissionCategoryCreated.as_str(),
                    "permission_category",
                )
                .with_entity_id(category.id().to_string())
                .with_detail(json!({ "name": category.name().as_str() })),
            )
            .await?;
        transaction.commit().await?;

        info!(category_id = %category.id(), name = %category.name(), "permission category created");
        Ok(category)
    }

    /// Defines a new permission under an existing category.
    pub async fn create_permission(
        &self,
        actor: &ActorIdentity,
        input: CreatePermissionInput,
    ) -> AppResult<Permission> {
        let permission = Permission::new(
            PermissionId::new(),
            input.category_id,
            input.code,
            input.name,
            input.description,
        )?;

        let mut transaction = self.store.begin(TransactionMode::ReadWrite).await?;
        require_category(transaction.as_mut(), permission.category_id()).await?;

        if transaction
            .find_permission_by_code(permission.code())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.code()
            )));
        }

        transaction.insert_permission(&permission).await?;
        self.audit_trail
            .record_action(
                transaction.as_mut(),
                Some(actor),
                ActionRecord::new(AuditAction::PermissionCreated.as_str(), "permission")
                    .with_entity_id(permission.id().to_string())
                    .with_detail(json!({
                        "code": permission.code().as_str(),
                        "category_id": permission.category_id().to_string(),
                    })),
            )
            .await?;
        transaction.commit().await?;

        info!(permission_id = %permission.id(), code = %permission.code(), "permission created");
        Ok(permission)
    }

    /// Lists permissions of one category ordered by code.
    pub async fn list_by_category(
        &self,
        category_id: PermissionCategoryId,
    ) -> AppResult<Vec<Permission>> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        require_category(transaction.as_mut(), category_id).await?;
        transaction.list_permissions_by_category(category_id).await
    }

    /// Looks up a permission by code.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<Permission>> {
        let code = PermissionCode::new(code)?;
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        transaction.find_permission_by_code(&code).await
    }

    /// Lists categories ordered by name.
    pub async fn list_categories(&self) -> AppResult<Vec<PermissionCategory>> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        transaction.list_categories().await
    }
}

async fn require_category(
    transaction: &mut dyn AccessControlTransaction,
    category_id: PermissionCategoryId,
) -> AppResult<PermissionCategory> {
    transaction
        .find_category(category_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("permission category '{category_id}' was not found"))
        })
}
