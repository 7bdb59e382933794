use super::*;

use std::collections::HashMap;

use precinct_domain::{MAX_HIERARCHY_DEPTH, RoleForest, hierarchy_depth_exceeded};

use crate::TransactionMode;

impl RoleGraphService {
    /// Looks up a role.
    pub async fn find_role(&self, role_id: RoleId) -> AppResult<Role> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        require_role(transaction.as_mut(), role_id).await
    }

    /// Lists all roles, most senior first.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        transaction.list_roles().await
    }

    /// Lists direct children of a role.
    pub async fn children(&self, role_id: RoleId) -> AppResult<Vec<Role>> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        require_role(transaction.as_mut(), role_id).await?;
        transaction.list_child_roles(role_id).await
    }

    /// Returns the ancestors of a role, root first, excluding the role itself.
    pub async fn ancestors(&self, role_id: RoleId) -> AppResult<Vec<Role>> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        let role = require_role(transaction.as_mut(), role_id).await?;

        let mut chain = Vec::new();
        let mut next = role.parent_id();
        while let Some(parent_id) = next {
            if chain.len() == MAX_HIERARCHY_DEPTH {
                return Err(hierarchy_depth_exceeded(role_id));
            }

            let parent = transaction.find_role(parent_id).await?.ok_or_else(|| {
                AppError::Internal(format!(
                    "role '{parent_id}' referenced as parent does not exist"
                ))
            })?;
            next = parent.parent_id();
            chain.push(parent);
        }

        chain.reverse();
        Ok(chain)
    }

    /// Returns every role whose ancestor chain includes the given role.
    pub async fn descendants(&self, role_id: RoleId) -> AppResult<Vec<Role>> {
        let mut transaction = self.store.begin(TransactionMode::ReadOnly).await?;
        let roles = transaction.list_roles().await?;

        let descendant_ids = RoleForest::from_roles(&roles).descendants(role_id)?;
        let mut by_id: HashMap<RoleId, Role> =
            roles.into_iter().map(|role| (role.id(), role)).collect();

        Ok(descendant_ids
            .into_iter()
            .filter_map(|descendant_id| by_id.remove(&descendant_id))
            .collect())
    }
}
