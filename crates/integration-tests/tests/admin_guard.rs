//! Last-admin and self-delete guards against a real database.
//!
//! Run with: `cargo test -p sitedesk-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use sitedesk_core::{UserId, UserRole};
use sitedesk_integration_tests::TestDb;
use sitedesk_server::db::UserChanges;
use sitedesk_server::services::{AdminGuard, AdminGuardError, GuardedAction, Violation};

fn deactivate() -> UserChanges {
    UserChanges {
        is_active: Some(false),
        ..UserChanges::default()
    }
}

fn demote() -> UserChanges {
    UserChanges {
        role: Some(UserRole::Editor),
        ..UserChanges::default()
    }
}

fn assert_last_admin(result: Result<impl std::fmt::Debug, AdminGuardError>, action: GuardedAction) {
    match result {
        Err(AdminGuardError::Violation(Violation::LastActiveAdmin(got))) => {
            assert_eq!(got, action);
        }
        other => panic!("expected last-admin violation, got {other:?}"),
    }
}

// =============================================================================
// Sequential mutations
// =============================================================================

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_second_admin_cannot_be_removed_after_first_is_deactivated() {
    let db = TestDb::new().await;
    let a = db.seed_user("a@example.com", UserRole::Admin, None).await;
    let b = db.seed_user("b@example.com", UserRole::Admin, None).await;
    let viewer = db.seed_user("c@example.com", UserRole::Viewer, None).await;
    let guard = AdminGuard::new(&db.pool);

    let updated = guard.update_user(a.id, &deactivate()).await.unwrap();
    assert!(!updated.is_active);
    assert_eq!(db.active_admins().await, 1);

    assert_last_admin(
        guard.update_user(b.id, &deactivate()).await,
        GuardedAction::Deactivate,
    );
    assert_last_admin(
        guard.delete_user(viewer.id, b.id).await,
        GuardedAction::Delete,
    );

    let b_now = db.user(&b).await.unwrap();
    assert!(b_now.is_active_admin());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_last_admin_cannot_be_demoted() {
    let db = TestDb::new().await;
    let admin = db.seed_user("admin@example.com", UserRole::Admin, None).await;
    let guard = AdminGuard::new(&db.pool);

    assert_last_admin(
        guard.update_user(admin.id, &demote()).await,
        GuardedAction::Demote,
    );

    let renamed = guard
        .update_user(
            admin.id,
            &UserChanges {
                name: Some("Renamed".to_string()),
                ..UserChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Renamed");
    assert_eq!(renamed.role, UserRole::Admin);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_inactive_admin_can_be_deleted() {
    let db = TestDb::new().await;
    let a = db.seed_user("a@example.com", UserRole::Admin, None).await;
    let b = db.seed_user("b@example.com", UserRole::Admin, None).await;
    let guard = AdminGuard::new(&db.pool);

    guard.update_user(b.id, &deactivate()).await.unwrap();
    guard.delete_user(a.id, b.id).await.unwrap();

    assert!(db.user(&b).await.is_none());
    assert_eq!(db.active_admins().await, 1);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_self_delete_is_refused() {
    let db = TestDb::new().await;
    let a = db.seed_user("a@example.com", UserRole::Admin, None).await;
    db.seed_user("b@example.com", UserRole::Admin, None).await;

    let err = AdminGuard::new(&db.pool)
        .delete_user(a.id, a.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AdminGuardError::Violation(Violation::SelfDelete)
    ));
    assert!(db.user(&a).await.is_some());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_missing_user_is_not_found() {
    let db = TestDb::new().await;
    let admin = db.seed_user("admin@example.com", UserRole::Admin, None).await;
    let guard = AdminGuard::new(&db.pool);

    assert!(matches!(
        guard.update_user(UserId::new(9999), &deactivate()).await,
        Err(AdminGuardError::NotFound)
    ));
    assert!(matches!(
        guard.delete_user(admin.id, UserId::new(9999)).await,
        Err(AdminGuardError::NotFound)
    ));
}

// =============================================================================
// Concurrent mutations
// =============================================================================

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_concurrent_deactivations_keep_one_admin() {
    let db = TestDb::new().await;
    let a = db.seed_user("a@example.com", UserRole::Admin, None).await;
    let b = db.seed_user("b@example.com", UserRole::Admin, None).await;
    let guard = AdminGuard::new(&db.pool);

    let changes = deactivate();
    let (first, second) = tokio::join!(
        guard.update_user(a.id, &changes),
        guard.update_user(b.id, &changes),
    );

    let succeeded = usize::from(first.is_ok()) + usize::from(second.is_ok());
    assert_eq!(succeeded, 1, "{first:?} / {second:?}");
    assert_eq!(db.active_admins().await, 1);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_concurrent_delete_and_demote_keep_one_admin() {
    let db = TestDb::new().await;
    let a = db.seed_user("a@example.com", UserRole::Admin, None).await;
    let b = db.seed_user("b@example.com", UserRole::Admin, None).await;
    let guard = AdminGuard::new(&db.pool);

    let changes = demote();
    let (deleted, demoted) = tokio::join!(
        guard.delete_user(a.id, b.id),
        guard.update_user(a.id, &changes),
    );

    assert!(deleted.is_ok() != demoted.is_ok(), "{deleted:?} / {demoted:?}");
    assert_eq!(db.active_admins().await, 1);
}
