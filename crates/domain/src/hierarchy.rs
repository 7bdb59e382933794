//! Role hierarchy algorithms.
//!
//! The hierarchy is a forest: every role has at most one parent. Re-parenting
//! role `R` under candidate `P` is rejected iff `R` is `P` or one of `P`'s
//! ancestors, which is sufficient to keep the forest acyclic.

use std::collections::{BTreeSet, HashMap, VecDeque};

use precinct_core::{AppError, AppResult};

use crate::{Role, RoleId};

/// Upper bound on parent links followed while walking a chain.
///
/// Exceeding it means stored data is corrupted, not that the input is invalid.
pub const MAX_HIERARCHY_DEPTH: usize = 64;

/// Rejects a re-parent of `role_id` under `candidate_parent_id`.
///
/// `candidate_ancestors` is the ancestor chain of the candidate parent, in any
/// order, excluding the candidate itself.
pub fn ensure_reparent_allowed(
    role_id: RoleId,
    candidate_parent_id: RoleId,
    candidate_ancestors: &[RoleId],
) -> AppResult<()> {
    if role_id == candidate_parent_id {
        return Err(AppError::Conflict(format!(
            "self-parent: role '{role_id}' cannot be its own parent"
        )));
    }

    if candidate_ancestors.contains(&role_id) {
        return Err(AppError::Conflict(format!(
            "cycle: role '{candidate_parent_id}' descends from role '{role_id}'"
        )));
    }

    Ok(())
}

/// Builds the depth-guard error for a chain starting at `role_id`.
#[must_use]
pub fn hierarchy_depth_exceeded(role_id: RoleId) -> AppError {
    AppError::Internal(format!(
        "role hierarchy above '{role_id}' exceeds {MAX_HIERARCHY_DEPTH} levels"
    ))
}

/// In-memory view of parent links for a set of loaded roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleForest {
    parents: HashMap<RoleId, Option<RoleId>>,
}

impl RoleForest {
    /// Creates a forest from loaded roles.
    #[must_use]
    pub fn from_roles<'a>(roles: impl IntoIterator<Item = &'a Role>) -> Self {
        Self {
            parents: roles
                .into_iter()
                .map(|role| (role.id(), role.parent_id()))
                .collect(),
        }
    }

    /// Returns every role whose ancestor chain includes `role_id`.
    pub fn descendants(&self, role_id: RoleId) -> AppResult<BTreeSet<RoleId>> {
        if !self.parents.contains_key(&role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        let mut children: HashMap<RoleId, Vec<RoleId>> = HashMap::new();
        for (child_id, parent_id) in &self.parents {
            if let Some(parent_id) = parent_id {
                children.entry(*parent_id).or_default().push(*child_id);
            }
        }

        let mut found = BTreeSet::new();
        let mut queue = VecDeque::from([role_id]);
        while let Some(current) = queue.pop_front() {
            for child_id in children.get(&current).into_iter().flatten() {
                if *child_id != role_id && found.insert(*child_id) {
                    queue.push_back(*child_id);
                }
            }
        }

        Ok(found)
    }
}
