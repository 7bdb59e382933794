use precinct_core::{AppError, UserId};
use precinct_domain::{AdminPermission, Role, RoleFieldUpdate};

use crate::test_support::Fixture;
use crate::{ActionLogQuery, CreateRoleInput, RoleHistoryQuery};

/// Gives the fixture actor an administrator role holding `permissions`.
async fn administrator(fixture: &Fixture, permissions: &[AdminPermission]) -> Role {
    let admin = fixture.role("Administrator", 100, None).await;
    let category = fixture.category("Administration").await;
    for permission in permissions {
        let permission = fixture.permission(&category, permission.as_str()).await;
        fixture.grant(&admin, &permission).await;
    }

    assert!(
        fixture
            .services
            .assignments
            .assign(None, fixture.actor.user_id(), admin.id())
            .await
            .is_ok()
    );
    admin
}

fn create_input(name: &str, parent: Option<&Role>) -> CreateRoleInput {
    CreateRoleInput {
        name: name.to_owned(),
        description: String::new(),
        level: Some(40),
        parent_id: parent.map(Role::id),
        is_system: false,
    }
}

#[tokio::test]
async fn actor_without_permission_is_forbidden() {
    let fixture = Fixture::new();
    let administration = &fixture.services.administration;

    assert!(matches!(
        administration.list_roles(&fixture.actor).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        administration
            .create_role(&fixture.actor, create_input("Detective", None))
            .await,
        Err(AppError::Forbidden(_))
    ));
    assert!(
        fixture
            .services
            .role_graph
            .list_roles()
            .await
            .unwrap_or_default()
            .is_empty()
    );
}

#[tokio::test]
async fn editing_requires_permission_and_management_edge() {
    let fixture = Fixture::new();
    let admin = administrator(&fixture, &[AdminPermission::RoleEdit]).await;
    let officer = fixture.role("Police Officer", 40, None).await;
    let administration = &fixture.services.administration;
    let describe = || RoleFieldUpdate {
        description: Some("Patrol".to_owned()),
        ..RoleFieldUpdate::default()
    };

    assert!(matches!(
        administration
            .update_role(&fixture.actor, officer.id(), describe())
            .await,
        Err(AppError::Forbidden(_))
    ));

    fixture.edge(&admin, &officer).await;
    let updated = administration
        .update_role(&fixture.actor, officer.id(), describe())
        .await;
    assert_eq!(
        updated.map(|role| role.description().to_owned()).ok(),
        Some("Patrol".to_owned())
    );
}

#[tokio::test]
async fn creating_under_a_parent_requires_managing_it() {
    let fixture = Fixture::new();
    let admin = administrator(&fixture, &[AdminPermission::RoleCreate]).await;
    let sergeant = fixture.role("Sergeant", 60, None).await;
    let administration = &fixture.services.administration;

    assert!(
        administration
            .create_role(&fixture.actor, create_input("Desk Clerk", None))
            .await
            .is_ok()
    );
    assert!(matches!(
        administration
            .create_role(&fixture.actor, create_input("Police Officer", Some(&sergeant)))
            .await,
        Err(AppError::Forbidden(_))
    ));

    fixture.edge(&admin, &sergeant).await;
    let created = administration
        .create_role(&fixture.actor, create_input("Police Officer", Some(&sergeant)))
        .await;
    assert_eq!(
        created.map(|role| role.parent_id()).ok(),
        Some(Some(sergeant.id()))
    );
}

#[tokio::test]
async fn system_roles_cannot_be_created_through_administration() {
    let fixture = Fixture::new();
    let admin = administrator(
        &fixture,
        &[AdminPermission::RoleCreate, AdminPermission::SystemSettings],
    )
    .await;
    let administration = &fixture.services.administration;

    let result = administration
        .create_role(
            &fixture.actor,
            CreateRoleInput {
                is_system: true,
                ..create_input("Chief of Police", None)
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let roles = fixture
        .services
        .role_graph
        .list_roles()
        .await
        .unwrap_or_default();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].id(), admin.id());
}

#[tokio::test]
async fn assignment_requires_managing_the_role() {
    let fixture = Fixture::new();
    let admin = administrator(&fixture, &[AdminPermission::RoleAssign]).await;
    let officer = fixture.role("Police Officer", 40, None).await;
    let user_id = UserId::new();
    let administration = &fixture.services.administration;

    assert!(matches!(
        administration
            .assign_role(&fixture.actor, user_id, officer.id())
            .await,
        Err(AppError::Forbidden(_))
    ));

    fixture.edge(&admin, &officer).await;
    let assignment = administration
        .assign_role(&fixture.actor, user_id, officer.id())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(assignment.assigned_by, Some(fixture.actor.user_id()));

    assert!(matches!(
        administration
            .assign_role(&fixture.actor, user_id, officer.id())
            .await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn unassignment_requires_managing_every_held_role() {
    let fixture = Fixture::new();
    let admin = administrator(&fixture, &[AdminPermission::RoleAssign]).await;
    let officer = fixture.role("Police Officer", 40, None).await;
    let detective = fixture.role("Detective", 50, None).await;
    fixture.edge(&admin, &officer).await;

    let user_id = UserId::new();
    for role in [&officer, &detective] {
        assert!(
            fixture
                .services
                .assignments
                .assign(None, user_id, role.id())
                .await
                .is_ok()
        );
    }

    let administration = &fixture.services.administration;
    assert!(matches!(
        administration
            .unassign_role(&fixture.actor, user_id, officer.id())
            .await,
        Err(AppError::Forbidden(_))
    ));

    fixture.edge(&admin, &detective).await;
    assert!(
        administration
            .unassign_role(&fixture.actor, user_id, officer.id())
            .await
            .is_ok()
    );
    assert!(matches!(
        administration
            .unassign_role(&fixture.actor, user_id, officer.id())
            .await,
        Err(AppError::NotFound(_))
    ));

    let remaining = fixture
        .services
        .evaluator
        .role_ids_for_user(user_id)
        .await
        .unwrap_or_default();
    assert_eq!(remaining, vec![detective.id()]);
}

#[tokio::test]
async fn management_edges_require_system_settings() {
    let fixture = Fixture::new();
    administrator(&fixture, &[AdminPermission::RoleView]).await;
    let sergeant = fixture.role("Sergeant", 60, None).await;
    let officer = fixture.role("Police Officer", 40, None).await;
    let administration = &fixture.services.administration;

    assert!(matches!(
        administration
            .add_management_edge(&fixture.actor, sergeant.id(), officer.id())
            .await,
        Err(AppError::Forbidden(_))
    ));
    assert!(
        administration
            .manageable_roles(&fixture.actor, sergeant.id())
            .await
            .unwrap_or_default()
            .is_empty()
    );
}

#[tokio::test]
async fn audit_reads_are_gated_separately() {
    let fixture = Fixture::new();
    let admin = administrator(&fixture, &[AdminPermission::RoleView]).await;
    let administration = &fixture.services.administration;

    let history = administration
        .role_history(
            &fixture.actor,
            admin.id(),
            RoleHistoryQuery {
                limit: 10,
                offset: 0,
            },
        )
        .await
        .unwrap_or_default();
    assert_eq!(history.len(), 1);

    assert!(matches!(
        administration
            .list_actions(
                &fixture.actor,
                ActionLogQuery {
                    limit: 10,
                    offset: 0,
                    action: None,
                    actor_id: None,
                },
            )
            .await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn revoked_edge_applies_from_the_next_command() {
    let fixture = Fixture::new();
    let admin = administrator(&fixture, &[AdminPermission::RoleEdit]).await;
    let officer = fixture.role("Police Officer", 40, None).await;
    fixture.edge(&admin, &officer).await;
    let administration = &fixture.services.administration;
    let level = |level| RoleFieldUpdate {
        level: Some(level),
        ..RoleFieldUpdate::default()
    };

    assert!(
        administration
            .update_role(&fixture.actor, officer.id(), level(41))
            .await
            .is_ok()
    );
    assert!(
        fixture
            .services
            .management_policy
            .remove_edge(&fixture.actor, admin.id(), officer.id())
            .await
            .is_ok()
    );
    assert!(matches!(
        administration
            .update_role(&fixture.actor, officer.id(), level(42))
            .await,
        Err(AppError::Forbidden(_))
    ));
}
