use std::collections::BTreeSet;

use precinct_core::{AppError, UserId};
use precinct_domain::{PermissionCode, Role, RoleId};
use proptest::prelude::*;

use crate::test_support::Fixture;

fn codes(values: &[&str]) -> BTreeSet<PermissionCode> {
    values
        .iter()
        .filter_map(|value| PermissionCode::new(*value).ok())
        .collect()
}

/// Officer holds case and evidence viewing, detective adds editing, analyst
/// holds reporting only.
async fn precinct_roles(fixture: &Fixture) -> Vec<Role> {
    let officer = fixture.role("Police Officer", 40, None).await;
    let detective = fixture.role("Detective", 50, None).await;
    let analyst = fixture.role("Crime Analyst", 50, None).await;

    let cases = fixture.category("Case Management").await;
    let case_view = fixture.permission(&cases, "case.view").await;
    let case_edit = fixture.permission(&cases, "case.edit").await;
    let evidence = fixture.category("Evidence").await;
    let evidence_view = fixture.permission(&evidence, "evidence.view").await;
    let reports = fixture.category("Reports").await;
    let report_create = fixture.permission(&reports, "report.create").await;

    fixture.grant(&officer, &case_view).await;
    fixture.grant(&officer, &evidence_view).await;
    fixture.grant(&detective, &case_view).await;
    fixture.grant(&detective, &case_edit).await;
    fixture.grant(&analyst, &report_create).await;

    vec![officer, detective, analyst]
}

#[tokio::test]
async fn effective_permissions_are_the_union_of_held_roles() {
    let fixture = Fixture::new();
    let roles = precinct_roles(&fixture).await;

    let effective = fixture
        .services
        .evaluator
        .effective_permissions(&[roles[0].id(), roles[1].id()])
        .await
        .unwrap_or_default();
    assert_eq!(effective, codes(&["case.edit", "case.view", "evidence.view"]));
}

#[tokio::test]
async fn permissions_are_not_inherited_through_the_hierarchy() {
    let fixture = Fixture::new();
    let sergeant = fixture.role("Sergeant", 60, None).await;
    let officer = fixture.role("Police Officer", 40, Some(sergeant.id())).await;
    let cases = fixture.category("Case Management").await;
    let case_view = fixture.permission(&cases, "case.view").await;
    fixture.grant(&officer, &case_view).await;

    let evaluator = &fixture.services.evaluator;
    assert!(
        !evaluator
            .has_permission(&[sergeant.id()], "case.view")
            .await
            .unwrap_or(true)
    );
    assert!(
        evaluator
            .effective_permissions(&[])
            .await
            .unwrap_or_default()
            .is_empty()
    );
}

#[tokio::test]
async fn malformed_codes_are_never_granted() {
    let fixture = Fixture::new();
    let roles = precinct_roles(&fixture).await;
    let evaluator = &fixture.services.evaluator;

    for code in ["Case.View", "case view", ""] {
        assert_eq!(
            evaluator.has_permission(&[roles[0].id()], code).await.ok(),
            Some(false)
        );
    }
    assert_eq!(
        evaluator
            .has_permission(&[roles[0].id()], "case.view")
            .await
            .ok(),
        Some(true)
    );
}

#[tokio::test]
async fn unknown_roles_contribute_nothing() {
    let fixture = Fixture::new();
    let roles = precinct_roles(&fixture).await;

    let effective = fixture
        .services
        .evaluator
        .effective_permissions(&[RoleId::new(), roles[2].id()])
        .await
        .unwrap_or_default();
    assert_eq!(effective, codes(&["report.create"]));
}

#[tokio::test]
async fn user_management_requires_authority_over_every_held_role() {
    let fixture = Fixture::new();
    let sergeant = fixture.role("Sergeant", 60, None).await;
    let officer = fixture.role("Police Officer", 40, None).await;
    let trainee = fixture.role("Trainee Officer", 30, None).await;
    fixture.edge(&sergeant, &officer).await;

    let evaluator = &fixture.services.evaluator;
    assert!(
        evaluator
            .can_manage_user(&[sergeant.id()], &[officer.id()])
            .await
            .unwrap_or_default()
    );
    assert!(
        !evaluator
            .can_manage_user(&[sergeant.id()], &[officer.id(), trainee.id()])
            .await
            .unwrap_or(true)
    );
    assert!(
        evaluator
            .can_manage_user(&[sergeant.id()], &[])
            .await
            .unwrap_or_default()
    );
    assert!(
        evaluator
            .can_manage_role(&[sergeant.id()], officer.id())
            .await
            .unwrap_or_default()
    );
}

#[tokio::test]
async fn require_permission_reads_the_actor_assignments() {
    let fixture = Fixture::new();
    let roles = precinct_roles(&fixture).await;
    let evaluator = &fixture.services.evaluator;

    assert!(matches!(
        evaluator.require_permission(&fixture.actor, "case.view").await,
        Err(AppError::Forbidden(_))
    ));

    assert!(
        fixture
            .services
            .assignments
            .assign(None, fixture.actor.user_id(), roles[0].id())
            .await
            .is_ok()
    );
    assert!(
        evaluator
            .require_permission(&fixture.actor, "case.view")
            .await
            .is_ok()
    );
    assert!(matches!(
        evaluator.require_permission(&fixture.actor, "case.edit").await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn roles_for_user_are_listed_by_name() {
    let fixture = Fixture::new();
    let roles = precinct_roles(&fixture).await;
    let user_id = UserId::new();
    for role in &roles {
        assert!(
            fixture
                .services
                .assignments
                .assign(None, user_id, role.id())
                .await
                .is_ok()
        );
    }

    let held = fixture
        .services
        .evaluator
        .roles_for_user(user_id)
        .await
        .unwrap_or_default();
    let names: Vec<&str> = held.iter().map(|role| role.name().as_str()).collect();
    assert_eq!(names, vec!["Crime Analyst", "Detective", "Police Officer"]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn effective_permissions_ignore_order_and_repetition(
        picks in prop::collection::vec(0usize..3, 0..8)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap_or_else(|_| unreachable!());

        let (forward, reversed, distinct) = runtime.block_on(async {
            let fixture = Fixture::new();
            let roles = precinct_roles(&fixture).await;
            let evaluator = &fixture.services.evaluator;

            let mut role_ids: Vec<RoleId> = picks.iter().map(|index| roles[*index].id()).collect();
            let forward = evaluator.effective_permissions(&role_ids).await.unwrap_or_default();
            role_ids.reverse();
            let reversed = evaluator.effective_permissions(&role_ids).await.unwrap_or_default();
            role_ids.sort();
            role_ids.dedup();
            let distinct = evaluator.effective_permissions(&role_ids).await.unwrap_or_default();

            (forward, reversed, distinct)
        });

        prop_assert_eq!(&forward, &reversed);
        prop_assert_eq!(&forward, &distinct);
    }

    #[test]
    fn effective_permissions_ignore_grant_order(
        order in Just(vec!["case.view", "case.edit", "evidence.view", "report.create"]).prop_shuffle()
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap_or_else(|_| unreachable!());

        let effective = runtime.block_on(async {
            let fixture = Fixture::new();
            let detective = fixture.role("Detective", 50, None).await;
            let category = fixture.category("Investigations").await;
            for code in &order {
                let permission = fixture.permission(&category, code).await;
                fixture.grant(&detective, &permission).await;
            }

            fixture
                .services
                .evaluator
                .effective_permissions(&[detective.id()])
                .await
                .unwrap_or_default()
        });

        prop_assert_eq!(
            effective,
            codes(&["case.edit", "case.view", "evidence.view", "report.create"])
        );
    }
}
