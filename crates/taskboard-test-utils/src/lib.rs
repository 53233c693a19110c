//! Testing utilities for the taskboard workspace
//!
//! Shared fixtures: an in-memory backend with failure injection and a
//! deterministic id sequence, plus adapter constructors.

#![allow(missing_docs)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use taskboard_core::{Task, TaskId, User};
use taskboard_store::{BackendError, BackendKind, StorageAdapter, StorageBackend};

/// Adapter rooted in a fresh temp directory (primary mechanism available)
pub fn temp_adapter() -> (tempfile::TempDir, Arc<StorageAdapter>) {
    let dir = tempfile::tempdir().unwrap();
    let adapter = Arc::new(StorageAdapter::new(dir.path()));
    (dir, adapter)
}

/// Adapter whose primary root can never be created (forces the fallback)
pub fn unavailable_adapter() -> (tempfile::NamedTempFile, Arc<StorageAdapter>) {
    let file = tempfile::NamedTempFile::new().unwrap();
    let adapter = Arc::new(StorageAdapter::new(file.path().join("nested")));
    (file, adapter)
}

#[derive(Debug, Clone)]
struct FakeRow {
    id: i64,
    username: String,
    task: Task,
}

/// In-memory remote backend
///
/// Behaves like the hosted store: assigns sequential row ids on insert,
/// rejects duplicate usernames, and records issued task deletions. One
/// switch makes every operation fail, for degradation tests.
#[derive(Debug, Default)]
pub struct FakeBackend {
    users: Mutex<Vec<User>>,
    rows: Mutex<Vec<FakeRow>>,
    next_id: AtomicI64,
    failing: AtomicBool,
    deleted: Mutex<Vec<TaskId>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn seed_users(&self, users: &[User]) {
        self.users.lock().unwrap().extend_from_slice(users);
    }

    /// Insert a row directly, returning its assigned id
    pub fn seed_task(&self, username: &str, task: Task) -> TaskId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.rows.lock().unwrap().push(FakeRow {
            id,
            username: username.to_string(),
            task,
        });
        TaskId(id)
    }

    pub fn user_rows(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    pub fn task_row(&self, id: TaskId) -> Option<Task> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == id.0)
            .map(|row| row.task.clone())
    }

    /// Ids of task rows deleted through the backend
    pub fn deleted_task_ids(&self) -> Vec<TaskId> {
        self.deleted.lock().unwrap().clone()
    }

    fn guard(&self) -> Result<(), BackendError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                status: 503,
                body: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FakeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn select_users(&self) -> Result<Vec<User>, BackendError> {
        self.guard()?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn insert_users(&self, users: &[User]) -> Result<(), BackendError> {
        self.guard()?;
        let mut stored = self.users.lock().unwrap();
        for user in users {
            if stored.iter().any(|u| u.username == user.username) {
                return Err(BackendError::Status {
                    status: 409,
                    body: format!("duplicate key: {}", user.username),
                });
            }
            stored.push(user.clone());
        }
        Ok(())
    }

    async fn upsert_users(&self, users: &[User]) -> Result<(), BackendError> {
        self.guard()?;
        let mut stored = self.users.lock().unwrap();
        for user in users {
            match stored.iter_mut().find(|u| u.username == user.username) {
                Some(existing) => *existing = user.clone(),
                None => stored.push(user.clone()),
            }
        }
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> Result<(), BackendError> {
        self.guard()?;
        self.users.lock().unwrap().retain(|u| u.username != username);
        Ok(())
    }

    async fn select_tasks(&self) -> Result<Vec<(String, Task)>, BackendError> {
        self.guard()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|row| {
                let mut task = row.task.clone();
                task.id = Some(TaskId(row.id));
                (row.username.clone(), task)
            })
            .collect())
    }

    async fn insert_task(
        &self,
        username: &str,
        task: &Task,
    ) -> Result<Option<TaskId>, BackendError> {
        self.guard()?;
        Ok(Some(self.seed_task(username, task.clone())))
    }

    async fn update_task(&self, task: &Task) -> Result<(), BackendError> {
        self.guard()?;
        let Some(id) = task.id else {
            return Ok(());
        };
        if let Some(row) = self.rows.lock().unwrap().iter_mut().find(|r| r.id == id.0) {
            row.task = task.clone();
        }
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), BackendError> {
        self.guard()?;
        self.rows.lock().unwrap().retain(|row| row.id != id.0);
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }
}
