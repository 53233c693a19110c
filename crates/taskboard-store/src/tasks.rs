//! Task board store
//!
//! Owns loading, normalizing, and persisting the username → task-list
//! mapping. Loads always resolve to a structurally valid board; individual
//! mutations carry their own remote leg, and the adapter mirror is the
//! durability floor for every save. There is deliberately no bulk task
//! upsert: pushing the whole board on every save would amplify writes and
//! churn backend ids.

use crate::adapter::StorageAdapter;
use crate::backend::local::{LocalBackend, TASKS_KEY};
use crate::backend::StorageBackend;
use crate::reconcile::{classify, group_rows, RemoteLeg};
use std::sync::Arc;
use taskboard_core::{today, Task, TaskBoard, TaskInput, User};

/// Store for the per-user task lists
pub struct TaskStore {
    backend: Arc<dyn StorageBackend>,
    local: LocalBackend,
    adapter: Arc<StorageAdapter>,
}

impl TaskStore {
    /// Create a store over the selected backend
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>, adapter: Arc<StorageAdapter>) -> Self {
        Self {
            local: LocalBackend::new(adapter.clone()),
            backend,
            adapter,
        }
    }

    /// Load the task board
    ///
    /// Rows are grouped over `users` as the key universe (every known user
    /// gets at least an empty list) and normalized to the canonical shape.
    /// Backend failure falls back to the adapter copy with the legacy-shape
    /// upgrade; a malformed adapter copy resets to an empty board. The
    /// normalized board is re-mirrored so the stored shape converges on the
    /// first load after an upgrade. Never fails, and loading twice with no
    /// mutation in between is a fixed point.
    pub async fn load(&self, users: &[User]) -> TaskBoard {
        let board = match self.backend.select_tasks().await {
            Ok(rows) => group_rows(users, rows),
            Err(error) => {
                if self.backend.kind().is_remote() {
                    tracing::warn!("remote task load failed, serving the local store: {error}");
                    self.local_floor(users).await
                } else {
                    tracing::warn!("stored task board is malformed, resetting: {error}");
                    group_rows(users, Vec::new())
                }
            }
        };
        self.save(&board);
        board
    }

    /// Persist the board to the adapter (durability floor)
    ///
    /// Remote persistence happens per mutation in `assign`/`update`/
    /// `delete`, never in bulk here.
    pub fn save(&self, board: &TaskBoard) {
        match serde_json::to_string(board) {
            Ok(raw) => self.adapter.set(TASKS_KEY, Some(&raw)),
            Err(error) => {
                tracing::warn!("task board not serializable, skipping mirror: {error}");
            }
        }
    }

    /// Assign a task, reloading the current board first
    ///
    /// Returns the updated board. Callers that already hold a fresh
    /// snapshot should use [`TaskStore::assign_into`] instead.
    pub async fn assign(
        &self,
        users: &[User],
        username: &str,
        input: impl Into<TaskInput>,
    ) -> TaskBoard {
        let mut board = self.load(users).await;
        self.assign_into(&mut board, username, input).await;
        board
    }

    /// Assign a task into an existing board snapshot
    ///
    /// The input may be a bare description or a partial draft; the assigned
    /// date defaults to today. On a successful remote insert the
    /// backend-assigned id is attached to the record before it is appended
    /// to the user's list (created if absent), and the board is saved.
    pub async fn assign_into(
        &self,
        board: &mut TaskBoard,
        username: &str,
        input: impl Into<TaskInput>,
    ) {
        let mut task = input.into().into_task(&today());
        let leg = classify(
            "task insert",
            self.backend.insert_task(username, &task).await,
        );
        if let RemoteLeg::Applied(Some(id)) = leg {
            task.id = Some(id);
        }
        board.push(username, task);
        self.save(board);
    }

    /// Push a full-row update of the task to the backend
    ///
    /// Skipped for records without an id (nothing addressable remotely).
    /// Failures are logged, not surfaced. Only the remote copy is touched;
    /// the caller persists the local structure via [`TaskStore::save`].
    pub async fn update(&self, task: &Task) -> RemoteLeg<()> {
        if task.id.is_none() {
            return RemoteLeg::Skipped;
        }
        classify("task update", self.backend.update_task(task).await)
    }

    /// Delete the task at `index` in the user's list
    ///
    /// Loads the current state first. When the addressed record carries a
    /// backend id the remote row is deleted best-effort; removal from the
    /// local list is by structural position. Returns the updated board.
    pub async fn delete(&self, users: &[User], username: &str, index: usize) -> TaskBoard {
        let mut board = self.load(users).await;
        if !board.contains_user(username) {
            return board;
        }
        if let Some(id) = board.task(username, index).and_then(|task| task.id) {
            let _ = classify("task delete", self.backend.delete_task(id).await);
        }
        board.remove_at(username, index);
        self.save(&board);
        board
    }

    async fn local_floor(&self, users: &[User]) -> TaskBoard {
        match self.local.select_tasks().await {
            Ok(rows) => group_rows(users, rows),
            Err(error) => {
                tracing::warn!("stored task board is malformed, resetting: {error}");
                group_rows(users, Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use taskboard_core::default_users;

    fn local_store() -> (tempfile::TempDir, TaskStore) {
        let dir = tempfile::tempdir().unwrap();
        let adapter = Arc::new(StorageAdapter::new(dir.path()));
        let backend: Arc<dyn StorageBackend> = Arc::new(LocalBackend::new(adapter.clone()));
        (dir, TaskStore::new(backend, adapter))
    }

    #[tokio::test]
    async fn tasks_load_covers_every_known_user() {
        let (_dir, store) = local_store();
        let users = default_users();
        let board = store.load(&users).await;
        assert_eq!(board.user_count(), users.len());
    }

    #[tokio::test]
    async fn tasks_load_is_a_fixed_point() {
        let (_dir, store) = local_store();
        let users = default_users();
        store.adapter.set(
            TASKS_KEY,
            Some(r#"{"user1":["legacy entry",{"text":"partial"}]}"#),
        );
        let first = store.load(&users).await;
        let second = store.load(&users).await;
        assert_eq!(first, second);
        // stored shape converged to canonical on the first load
        let raw = store.adapter.get(TASKS_KEY).unwrap();
        assert!(raw.contains(r#""assignedDate""#));
        // the bare-string element became a full record
        assert!(raw.contains(r#""text":"legacy entry""#));
        assert!(!raw.contains(r#"["legacy entry""#));
    }

    #[tokio::test]
    async fn tasks_malformed_blob_resets_to_empty_board() {
        let (_dir, store) = local_store();
        let users = default_users();
        store.adapter.set(TASKS_KEY, Some("]["));
        let board = store.load(&users).await;
        assert_eq!(board.user_count(), users.len());
        assert!(board.iter().all(|(_, tasks)| tasks.is_empty()));
    }

    #[tokio::test]
    async fn tasks_assign_defaults_and_persists() {
        let (_dir, store) = local_store();
        let users = default_users();
        let board = store.assign(&users, "user1", "Write report").await;
        let task = board.task("user1", 0).unwrap();
        assert_eq!(task.text, "Write report");
        assert_eq!(task.assigned_date, today());
        assert_eq!(task.id, None);

        // survives a reload
        let reloaded = store.load(&users).await;
        assert_eq!(reloaded.task("user1", 0), Some(task));
    }

    #[tokio::test]
    async fn tasks_assign_creates_missing_list() {
        let (_dir, store) = local_store();
        let users = default_users();
        let board = store.assign(&users, "ghost", "orphan work").await;
        assert_eq!(board.tasks("ghost").map(<[Task]>::len), Some(1));
    }

    #[tokio::test]
    async fn tasks_delete_removes_by_position() {
        let (_dir, store) = local_store();
        let users = default_users();
        let mut board = store.load(&users).await;
        store.assign_into(&mut board, "user1", "a").await;
        store.assign_into(&mut board, "user1", "b").await;

        let board = store.delete(&users, "user1", 0).await;
        let texts: Vec<&str> = board
            .tasks("user1")
            .unwrap()
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["b"]);
    }

    #[tokio::test]
    async fn tasks_delete_out_of_range_is_harmless() {
        let (_dir, store) = local_store();
        let users = default_users();
        let board = store.delete(&users, "user1", 4).await;
        assert_eq!(board.tasks("user1"), Some(&[][..]));
    }
}
