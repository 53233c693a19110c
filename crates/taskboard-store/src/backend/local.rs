//! Local fallback backend
//!
//! Serves the `StorageBackend` interface from the adapter's blobs. Reads
//! parse the persisted keys and upgrade legacy shapes; mutating operations
//! are accepted as no-ops, because durability on this path comes from the
//! stores mirroring every resolved collection back to the adapter.

use super::{BackendError, BackendKind, StorageBackend};
use crate::adapter::StorageAdapter;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;
use taskboard_core::{today, StoredTask, StoredUser, Task, TaskId, User};

/// Adapter key holding the JSON array of users
pub const USERS_KEY: &str = "users";

/// Adapter key holding the JSON object of username → task array
pub const TASKS_KEY: &str = "tasksByUser";

/// Adapter-backed implementation of the backend interface
#[derive(Debug, Clone)]
pub struct LocalBackend {
    adapter: Arc<StorageAdapter>,
}

impl LocalBackend {
    /// Serve from the given adapter
    #[inline]
    #[must_use]
    pub fn new(adapter: Arc<StorageAdapter>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn select_users(&self) -> Result<Vec<User>, BackendError> {
        let Some(raw) = self.adapter.get(USERS_KEY) else {
            return Ok(Vec::new());
        };
        let stored: Vec<StoredUser> = serde_json::from_str(&raw)?;
        Ok(stored.into_iter().map(StoredUser::normalize).collect())
    }

    async fn insert_users(&self, _users: &[User]) -> Result<(), BackendError> {
        Ok(())
    }

    async fn upsert_users(&self, _users: &[User]) -> Result<(), BackendError> {
        Ok(())
    }

    async fn delete_user(&self, _username: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn select_tasks(&self) -> Result<Vec<(String, Task)>, BackendError> {
        let Some(raw) = self.adapter.get(TASKS_KEY) else {
            return Ok(Vec::new());
        };
        let stored: IndexMap<String, Vec<StoredTask>> = serde_json::from_str(&raw)?;
        let today = today();
        let mut rows = Vec::new();
        for (username, tasks) in stored {
            for task in tasks {
                rows.push((username.clone(), task.upgrade(&today)));
            }
        }
        Ok(rows)
    }

    async fn insert_task(
        &self,
        _username: &str,
        _task: &Task,
    ) -> Result<Option<TaskId>, BackendError> {
        // no id to assign locally
        Ok(None)
    }

    async fn update_task(&self, _task: &Task) -> Result<(), BackendError> {
        Ok(())
    }

    async fn delete_task(&self, _id: TaskId) -> Result<(), BackendError> {
        Ok(())
    }
}
