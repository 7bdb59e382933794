use std::sync::Arc;

use precinct_application::{
    AccessControlServices, AccessControlStore, ActionLogQuery, CreateCategoryInput,
    CreatePermissionInput, CreateRoleInput, RoleHistoryQuery, RoleRepository, TransactionMode,
};
use precinct_core::{ActorIdentity, AppError, UserId};
use precinct_domain::{RoleChangeAction, RoleFieldUpdate};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresAccessControlStore;
use crate::SystemClock;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres access control tests: {error}");
    }

    Some(pool)
}

fn services(pool: PgPool) -> AccessControlServices {
    AccessControlServices::new(
        Arc::new(PostgresAccessControlStore::new(pool)),
        Arc::new(SystemClock),
    )
}

fn actor() -> ActorIdentity {
    ActorIdentity::new(UserId::new(), "Test Admin")
        .with_origin("127.0.0.1")
        .with_client("postgres-tests")
}

fn role_input(name: &str, level: i32) -> CreateRoleInput {
    CreateRoleInput {
        name: name.to_owned(),
        description: String::new(),
        level: Some(level),
        parent_id: None,
        is_system: false,
    }
}

#[tokio::test]
async fn set_parent_rejects_cycles_and_keeps_history() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let actor = actor();

    let sergeant = services
        .role_graph
        .create_role(&actor, role_input("Sergeant", 60))
        .await
        .unwrap_or_else(|_| unreachable!());
    let officer = services
        .role_graph
        .create_role(
            &actor,
            CreateRoleInput {
                parent_id: Some(sergeant.id()),
                ..role_input("Officer", 40)
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let cycle = services
        .role_graph
        .set_parent(&actor, sergeant.id(), Some(officer.id()))
        .await;
    assert!(matches!(cycle, Err(AppError::Conflict(message)) if message.starts_with("cycle")));

    let updated = services
        .role_graph
        .update_role(
            &actor,
            officer.id(),
            RoleFieldUpdate {
                level: Some(45),
                ..RoleFieldUpdate::default()
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(updated.level(), 45);

    let history = services
        .audit_trail
        .history_for_role(officer.id(), RoleHistoryQuery { limit: 10, offset: 0 })
        .await
        .unwrap_or_default();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, RoleChangeAction::Updated);
    assert_eq!(history[0].previous.as_ref().map(|value| value["level"].clone()), Some(40.into()));
    assert_eq!(history[0].new.as_ref().map(|value| value["level"].clone()), Some(45.into()));
    assert_eq!(history[1].action, RoleChangeAction::Created);
}

#[tokio::test]
async fn duplicate_permission_code_is_a_conflict() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let actor = actor();
    let code = format!("test.p{}", UserId::new().as_uuid().simple());

    let category = services
        .permission_registry
        .create_category(
            &actor,
            CreateCategoryInput {
                name: "Test".to_owned(),
                description: String::new(),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let input = CreatePermissionInput {
        category_id: category.id(),
        code: code.clone(),
        name: "Test permission".to_owned(),
        description: String::new(),
    };
    let first = services
        .permission_registry
        .create_permission(&actor, input.clone())
        .await;
    assert!(first.is_ok());

    let second = services
        .permission_registry
        .create_permission(&actor, input)
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    let entries = services
        .audit_trail
        .list_actions(ActionLogQuery {
            limit: 10,
            offset: 0,
            action: Some("permission.created".to_owned()),
            actor_id: Some(actor.user_id()),
        })
        .await
        .unwrap_or_default();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].origin.as_deref(), Some("127.0.0.1"));
}

#[tokio::test]
async fn read_only_transactions_reject_writes() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresAccessControlStore::new(pool);
    let role = precinct_domain::Role::create(
        "Read Only Probe",
        "",
        1,
        None,
        false,
        UserId::new(),
        chrono::Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());

    let mut transaction = store
        .begin(TransactionMode::ReadOnly)
        .await
        .unwrap_or_else(|_| unreachable!());
    let result = transaction.insert_role(&role).await;
    assert!(matches!(result, Err(AppError::Persistence(_))));
}

#[tokio::test]
async fn dropped_transaction_rolls_back() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresAccessControlStore::new(pool);
    let role = precinct_domain::Role::create(
        "Rolled Back",
        "",
        1,
        None,
        false,
        UserId::new(),
        chrono::Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());

    {
        let mut transaction = store
            .begin(TransactionMode::ReadWrite)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(transaction.insert_role(&role).await.is_ok());
    }

    let mut transaction = store
        .begin(TransactionMode::ReadOnly)
        .await
        .unwrap_or_else(|_| unreachable!());
    let found = transaction.find_role(role.id()).await;
    assert!(matches!(found, Ok(None)));
}
