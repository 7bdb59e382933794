use std::collections::HashMap;

use precinct_application::{
    AccessControlServices, CreateCategoryInput, CreatePermissionInput, CreateRoleInput,
};
use precinct_core::{ActorIdentity, AppError, AppResult, UserId};
use precinct_domain::{PermissionCategoryId, PermissionId, RoleId};
use tracing::info;

use crate::catalog::{
    ADMINISTRATOR_ROLE, CATEGORIES, GRANTS, MANAGEMENT_EDGES, PERMISSIONS, ROLES,
};

const SEED_ACTOR_NAME: &str = "precinct-admin seed";

/// Counts of catalog entries written by one run.
#[derive(Debug, Default)]
struct SeedSummary {
    categories: usize,
    permissions: usize,
    roles: usize,
    grants: usize,
    edges: usize,
}

/// Loads the baseline catalog. Entries that already exist are left untouched,
/// so the command can be rerun.
///
/// Each entry is written in its own transaction. A run that fails midway
/// leaves the entries written so far in place; rerunning completes the
/// catalog.
pub async fn run(
    services: &AccessControlServices,
    bootstrap_admin_user_id: Option<UserId>,
) -> AppResult<()> {
    let actor = ActorIdentity::new(
        bootstrap_admin_user_id.unwrap_or_else(|| UserId::from_uuid(uuid::Uuid::nil())),
        SEED_ACTOR_NAME,
    )
    .with_client("precinct-admin");
    let mut summary = SeedSummary::default();

    let category_ids = seed_categories(services, &actor, &mut summary).await?;
    let permission_ids = seed_permissions(services, &actor, &category_ids, &mut summary).await?;
    let role_ids = seed_roles(services, &actor, &mut summary).await?;
    seed_grants(services, &actor, &role_ids, &permission_ids, &mut summary).await?;
    seed_edges(services, &actor, &role_ids, &mut summary).await?;

    if let Some(user_id) = bootstrap_admin_user_id {
        assign_administrator(services, user_id, &role_ids).await?;
    }

    info!(
        categories = summary.categories,
        permissions = summary.permissions,
        roles = summary.roles,
        grants = summary.grants,
        edges = summary.edges,
        "catalog seed finished"
    );
    Ok(())
}

async fn seed_categories(
    services: &AccessControlServices,
    actor: &ActorIdentity,
    summary: &mut SeedSummary,
) -> AppResult<HashMap<&'static str, PermissionCategoryId>> {
    let existing: HashMap<String, PermissionCategoryId> = services
        .permission_registry
        .list_categories()
        .await?
        .into_iter()
        .map(|category| (category.name().as_str().to_owned(), category.id()))
        .collect();

    let mut ids = HashMap::with_capacity(CATEGORIES.len());
    for seed in CATEGORIES {
        let category_id = match existing.get(seed.name) {
            Some(category_id) => *category_id,
            None => {
                summary.categories += 1;
                services
                    .permission_registry
                    .create_category(
                        actor,
                        CreateCategoryInput {
                            name: seed.name.to_owned(),
                            description: seed.description.to_owned(),
                        },
                    )
                    .await?
                    .id()
            }
        };
        ids.insert(seed.key, category_id);
    }

    Ok(ids)
}

async fn seed_permissions(
    services: &AccessControlServices,
    actor: &ActorIdentity,
    category_ids: &HashMap<&'static str, PermissionCategoryId>,
    summary: &mut SeedSummary,
) -> AppResult<HashMap<&'static str, PermissionId>> {
    let mut ids = HashMap::with_capacity(PERMISSIONS.len());
    for seed in PERMISSIONS {
        let permission_id = match services.permission_registry.find_by_code(seed.code).await? {
            Some(permission) => permission.id(),
            None => {
                summary.permissions += 1;
                services
                    .permission_registry
                    .create_permission(
                        actor,
                        CreatePermissionInput {
                            category_id: lookup(category_ids, seed.category, "category")?,
                            code: seed.code.to_owned(),
                            name: seed.name.to_owned(),
                            description: seed.description.to_owned(),
                        },
                    )
                    .await?
                    .id()
            }
        };
        ids.insert(seed.code, permission_id);
    }

    Ok(ids)
}

async fn seed_roles(
    services: &AccessControlServices,
    actor: &ActorIdentity,
    summary: &mut SeedSummary,
) -> AppResult<HashMap<&'static str, RoleId>> {
    let existing: HashMap<String, RoleId> = services
        .role_graph
        .list_roles()
        .await?
        .into_iter()
        .filter(|role| role.is_system())
        .map(|role| (role.name().as_str().to_owned(), role.id()))
        .collect();

    let mut ids = HashMap::with_capacity(ROLES.len());
    for seed in ROLES {
        let role_id = match existing.get(seed.name) {
            Some(role_id) => *role_id,
            None => {
                let parent_id = seed
                    .parent
                    .map(|parent| lookup(&ids, parent, "role"))
                    .transpose()?;
                summary.roles += 1;
                services
                    .role_graph
                    .create_role(
                        actor,
                        CreateRoleInput {
                            name: seed.name.to_owned(),
                            description: seed.description.to_owned(),
                            level: Some(seed.level),
                            parent_id,
                            is_system: true,
                        },
                    )
                    .await?
                    .id()
            }
        };
        ids.insert(seed.key, role_id);
    }

    Ok(ids)
}

async fn seed_grants(
    services: &AccessControlServices,
    actor: &ActorIdentity,
    role_ids: &HashMap<&'static str, RoleId>,
    permission_ids: &HashMap<&'static str, PermissionId>,
    summary: &mut SeedSummary,
) -> AppResult<()> {
    for (role_key, codes) in GRANTS {
        let role_id = lookup(role_ids, role_key, "role")?;
        let granted: Vec<PermissionId> = services
            .grants
            .grants_for_role(role_id)
            .await?
            .iter()
            .map(|permission| permission.id())
            .collect();

        for code in *codes {
            let permission_id = lookup(permission_ids, code, "permission")?;
            if granted.contains(&permission_id) {
                continue;
            }

            services.grants.grant(actor, role_id, permission_id).await?;
            summary.grants += 1;
        }
    }

    Ok(())
}

async fn seed_edges(
    services: &AccessControlServices,
    actor: &ActorIdentity,
    role_ids: &HashMap<&'static str, RoleId>,
    summary: &mut SeedSummary,
) -> AppResult<()> {
    for (manager_key, manageable_key) in MANAGEMENT_EDGES {
        let manager_role_id = lookup(role_ids, manager_key, "role")?;
        let manageable_role_id = lookup(role_ids, manageable_key, "role")?;

        if services
            .management_policy
            .can_manage(&[manager_role_id], manageable_role_id)
            .await?
        {
            continue;
        }

        services
            .management_policy
            .add_edge(actor, manager_role_id, manageable_role_id)
            .await?;
        summary.edges += 1;
    }

    Ok(())
}

async fn assign_administrator(
    services: &AccessControlServices,
    user_id: UserId,
    role_ids: &HashMap<&'static str, RoleId>,
) -> AppResult<()> {
    let role_id = lookup(role_ids, ADMINISTRATOR_ROLE, "role")?;
    if services
        .evaluator
        .role_ids_for_user(user_id)
        .await?
        .contains(&role_id)
    {
        info!(user_id = %user_id, "bootstrap administrator already assigned");
        return Ok(());
    }

    services.assignments.assign(None, user_id, role_id).await?;
    info!(user_id = %user_id, role_id = %role_id, "bootstrap administrator assigned");
    Ok(())
}

fn lookup<T: Copy>(ids: &HashMap<&'static str, T>, key: &str, kind: &str) -> AppResult<T> {
    ids.get(key)
        .copied()
        .ok_or_else(|| AppError::Internal(format!("seed catalog references unknown {kind} '{key}'")))
}
