//! Remote-backend scenarios: id attachment, dual writes, and degradation.

use std::sync::Arc;
use taskboard_core::{default_users, Role, Task, TaskId, User};
use taskboard_store::{RemoteLeg, StorageBackend, UserStore};
use taskboard_test_utils::{temp_adapter, FakeBackend};

fn remote_store() -> (tempfile::TempDir, Arc<FakeBackend>, UserStore) {
    let (dir, adapter) = temp_adapter();
    let backend = Arc::new(FakeBackend::new());
    let store = UserStore::new(backend.clone() as Arc<dyn StorageBackend>, adapter);
    (dir, backend, store)
}

#[tokio::test]
async fn empty_remote_store_is_seeded_with_defaults() {
    let (_dir, backend, store) = remote_store();

    let users = store.load().await;
    assert_eq!(users, default_users());
    // the defaults were inserted into the backend, not only returned
    assert_eq!(backend.user_rows(), default_users());
}

#[tokio::test]
async fn add_user_short_circuits_on_remote_insert() {
    let (_dir, backend, store) = remote_store();
    store.load().await;

    assert!(store.add_user("alice", Role::User).await);
    assert!(backend
        .user_rows()
        .iter()
        .any(|u| u.username == "alice" && u.role == Role::User));

    let users = store.load().await;
    assert!(users.iter().any(|u| u.username == "alice"));
    let board = store.tasks().load(&users).await;
    assert_eq!(board.tasks("alice"), Some(&[][..]));
}

#[tokio::test]
async fn assign_attaches_the_backend_id() {
    let (_dir, _backend, store) = remote_store();
    let users = store.load().await;

    let board = store.tasks().assign(&users, "user1", "Write report").await;
    let task = board.task("user1", 0).unwrap();
    assert_eq!(task.id, Some(TaskId(1)));
}

#[tokio::test]
async fn lifecycle_updates_reach_the_remote_row() {
    let (_dir, backend, store) = remote_store();
    let users = store.load().await;

    let mut board = store.tasks().assign(&users, "user1", "Write report").await;
    let id = board.task("user1", 0).unwrap().id.unwrap();

    let task = board.set_completed("user1", 0, true).unwrap().clone();
    store.tasks().update(&task).await;
    let task = board.finalize("user1", 0).unwrap().clone();
    store.tasks().update(&task).await;
    store.tasks().save(&board);

    let row = backend.task_row(id).unwrap();
    assert!(row.completed);
    assert!(row.finalized);
    assert_eq!(row.admin_feedback, "");
}

#[tokio::test]
async fn return_to_user_pushes_the_rejection_reason() {
    let (_dir, backend, store) = remote_store();
    let users = store.load().await;

    let mut board = store.tasks().assign(&users, "user1", "Write report").await;
    let id = board.task("user1", 0).unwrap().id.unwrap();
    board.set_completed("user1", 0, true).unwrap();

    let task = board
        .return_to_user("user1", 0, "missing section 3")
        .unwrap()
        .clone();
    store.tasks().update(&task).await;
    store.tasks().save(&board);

    let row = backend.task_row(id).unwrap();
    assert!(!row.completed);
    assert!(!row.finalized);
    assert_eq!(row.admin_feedback, "missing section 3");
}

#[tokio::test]
async fn delete_issues_the_remote_row_delete() {
    let (_dir, backend, store) = remote_store();
    let users = store.load().await;

    let board = store.tasks().assign(&users, "user1", "Write report").await;
    let id = board.task("user1", 0).unwrap().id.unwrap();

    let board = store.tasks().delete(&users, "user1", 0).await;
    assert_eq!(board.tasks("user1"), Some(&[][..]));
    assert_eq!(backend.deleted_task_ids(), vec![id]);
}

#[tokio::test]
async fn update_without_an_id_is_skipped() {
    let (_dir, _backend, store) = remote_store();
    store.load().await;

    let outcome = store.tasks().update(&Task::new("never synced")).await;
    assert_eq!(outcome, RemoteLeg::Skipped);
}

#[tokio::test]
async fn users_round_trip_field_wise() {
    let (_dir, _backend, store) = remote_store();
    let mut users = store.load().await;
    users.push(User::new("carol", "pw", Role::User));

    store.save(&users).await;
    let reloaded = store.load().await;
    assert_eq!(reloaded, users);
}

#[tokio::test]
async fn remote_failure_degrades_mutations_to_local_only() {
    let (_dir, backend, store) = remote_store();
    let users = store.load().await;
    backend.set_failing(true);

    // the assignment succeeds without an id
    let board = store.tasks().assign(&users, "user1", "offline work").await;
    let task = board.task("user1", 0).unwrap();
    assert_eq!(task.id, None);

    // adding a user falls through to the local list
    assert!(store.add_user("alice", Role::User).await);
    let users = store.load().await;
    assert!(users.iter().any(|u| u.username == "alice"));
    assert!(!backend.user_rows().iter().any(|u| u.username == "alice"));
}

#[tokio::test]
async fn failed_remote_load_serves_the_mirror() {
    let (_dir, backend, store) = remote_store();
    let users = store.load().await;

    let board = store.tasks().assign(&users, "user1", "Write report").await;
    backend.set_failing(true);

    // the unsynced mirror is served instead of clobbering it with nothing
    let reloaded = store.tasks().load(&users).await;
    assert_eq!(reloaded, board);

    let reloaded_users = store.load().await;
    assert_eq!(reloaded_users, users);
}

#[tokio::test]
async fn delete_user_removes_remote_row_and_board_entry() {
    let (_dir, backend, store) = remote_store();
    let users = store.load().await;

    store.delete_user("user1").await;
    assert!(!backend.user_rows().iter().any(|u| u.username == "user1"));

    let users_after = store.load().await;
    let board = store.tasks().load(&users_after).await;
    assert!(!users_after.iter().any(|u| u.username == "user1"));
    assert!(!board.contains_user("user1"));
    assert_eq!(users_after.len(), users.len() - 1);
}

#[tokio::test]
async fn deleted_users_remote_tasks_are_orphaned_not_cascaded() {
    let (_dir, backend, store) = remote_store();
    let users = store.load().await;
    store.tasks().assign(&users, "user1", "doomed").await;

    store.delete_user("user1").await;
    assert!(!backend.user_rows().iter().any(|u| u.username == "user1"));

    // the task row stays in the remote store and regroups under its
    // username on the next load
    let users = store.load().await;
    let board = store.tasks().load(&users).await;
    assert_eq!(
        board.tasks("user1").map(|tasks| tasks.len()),
        Some(1)
    );
}

#[tokio::test]
async fn delete_sole_admin_is_refused_on_remote_too() {
    let (_dir, backend, store) = remote_store();
    store.load().await;

    store.delete_user("admin").await;
    assert!(backend.user_rows().iter().any(|u| u.username == "admin"));
}
