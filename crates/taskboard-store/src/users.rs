//! User account store
//!
//! Owns the canonical user list. Loads resolve through the injected backend
//! with the adapter as fallback and durability floor; policy violations
//! (duplicate or empty username, deleting or demoting the last admin) are
//! reported as `false`/no-op, never as errors.

use crate::adapter::StorageAdapter;
use crate::backend::local::{LocalBackend, USERS_KEY};
use crate::backend::StorageBackend;
use crate::tasks::TaskStore;
use std::sync::Arc;
use taskboard_core::{admin_count, default_users, Role, User, DEFAULT_PASSWORD};

/// Look up an account by exact username and plain-text password match
#[must_use]
pub fn authenticate<'a>(users: &'a [User], username: &str, password: &str) -> Option<&'a User> {
    users
        .iter()
        .find(|user| user.username == username && user.password == password)
}

/// Store for the canonical list of user accounts
pub struct UserStore {
    backend: Arc<dyn StorageBackend>,
    local: LocalBackend,
    adapter: Arc<StorageAdapter>,
    tasks: TaskStore,
}

impl UserStore {
    /// Create a store over the selected backend
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>, adapter: Arc<StorageAdapter>) -> Self {
        Self {
            local: LocalBackend::new(adapter.clone()),
            tasks: TaskStore::new(backend.clone(), adapter.clone()),
            backend,
            adapter,
        }
    }

    /// The task store sharing this store's backend and adapter
    #[inline]
    #[must_use]
    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    /// Load the user list
    ///
    /// An empty store seeds the defaults (and best-effort inserts them into
    /// the backend). Backend failure falls back to the adapter copy; a
    /// malformed adapter copy resets to the defaults. The resolved list is
    /// always mirrored back to the adapter so the fallback stays warm.
    /// Never fails.
    pub async fn load(&self) -> Vec<User> {
        let users = match self.backend.select_users().await {
            Ok(rows) if rows.is_empty() => {
                let defaults = default_users();
                if let Err(error) = self.backend.insert_users(&defaults).await {
                    tracing::warn!("seeding default users failed: {error}");
                }
                defaults
            }
            Ok(rows) => rows,
            Err(error) => {
                if self.backend.kind().is_remote() {
                    tracing::warn!("remote user load failed, serving the local store: {error}");
                    self.local_floor().await
                } else {
                    tracing::warn!("stored user list is malformed, resetting to defaults: {error}");
                    default_users()
                }
            }
        };
        self.mirror(&users);
        users
    }

    /// Persist the user list: backend upsert keyed on username (failure
    /// logged, not surfaced) plus the adapter mirror as durability floor
    pub async fn save(&self, users: &[User]) {
        if let Err(error) = self.backend.upsert_users(users).await {
            tracing::warn!("saving users degraded to the local store: {error}");
        }
        self.mirror(users);
    }

    /// Add a new account with the fixed default password
    ///
    /// Returns false for an empty (after trim) or duplicate username. A
    /// successful remote insert short-circuits; otherwise the account is
    /// appended locally and an empty task list is initialized for it.
    pub async fn add_user(&self, username: &str, role: Role) -> bool {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return false;
        }
        let users = self.load().await;
        if users.iter().any(|user| user.username == trimmed) {
            return false;
        }
        let new_user = User::new(trimmed, DEFAULT_PASSWORD, role);
        if self.backend.kind().is_remote() {
            match self
                .backend
                .insert_users(std::slice::from_ref(&new_user))
                .await
            {
                Ok(()) => return true,
                Err(error) => {
                    tracing::warn!("adding user degraded to the local store: {error}");
                }
            }
        }
        let mut updated = users;
        updated.push(new_user);
        self.save(&updated).await;
        let mut board = self.tasks.load(&updated).await;
        board.ensure_user(trimmed);
        self.tasks.save(&board);
        true
    }

    /// Delete an account and its tasks
    ///
    /// No-op for an unknown username and for the sole remaining admin. The
    /// backend row removal is best-effort; the local list and the user's
    /// board entry always go.
    pub async fn delete_user(&self, username: &str) {
        let mut users = self.load().await;
        let Some(user) = users.iter().find(|user| user.username == username) else {
            return;
        };
        if user.is_admin() && admin_count(&users) <= 1 {
            return;
        }
        if let Err(error) = self.backend.delete_user(username).await {
            tracing::warn!("deleting user degraded to the local store: {error}");
        }
        users.retain(|user| user.username != username);
        self.save(&users).await;
        let mut board = self.tasks.load(&users).await;
        board.remove_user(username);
        self.tasks.save(&board);
    }

    /// Change an account's password; false for an unknown username
    pub async fn set_password(&self, username: &str, new_password: &str) -> bool {
        let mut users = self.load().await;
        let Some(user) = users.iter_mut().find(|user| user.username == username) else {
            return false;
        };
        user.password = new_password.to_string();
        self.save(&users).await;
        true
    }

    /// Change an account's role
    ///
    /// Refused (false) for an unknown username and for demoting the sole
    /// remaining admin.
    pub async fn set_role(&self, username: &str, role: Role) -> bool {
        let mut users = self.load().await;
        let Some(index) = users.iter().position(|user| user.username == username) else {
            return false;
        };
        if users[index].is_admin() && !role.is_admin() && admin_count(&users) <= 1 {
            return false;
        }
        users[index].role = role;
        self.save(&users).await;
        true
    }

    fn mirror(&self, users: &[User]) {
        match serde_json::to_string(users) {
            Ok(raw) => self.adapter.set(USERS_KEY, Some(&raw)),
            Err(error) => {
                tracing::warn!("user list not serializable, skipping mirror: {error}");
            }
        }
    }

    async fn local_floor(&self) -> Vec<User> {
        match self.local.select_users().await {
            Ok(rows) if rows.is_empty() => default_users(),
            Ok(rows) => rows,
            Err(error) => {
                tracing::warn!("stored user list is malformed, resetting to defaults: {error}");
                default_users()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_core::ADMIN_USERNAME;

    fn local_store() -> (tempfile::TempDir, UserStore) {
        let dir = tempfile::tempdir().unwrap();
        let adapter = Arc::new(StorageAdapter::new(dir.path()));
        let backend: Arc<dyn StorageBackend> = Arc::new(LocalBackend::new(adapter.clone()));
        (dir, UserStore::new(backend, adapter))
    }

    #[tokio::test]
    async fn users_empty_store_seeds_defaults() {
        let (_dir, store) = local_store();
        let users = store.load().await;
        assert_eq!(users, default_users());
        // mirrored, so the next load reads the adapter copy
        assert_eq!(store.load().await, users);
    }

    #[tokio::test]
    async fn users_malformed_blob_resets_to_defaults() {
        let (_dir, store) = local_store();
        store.adapter.set(USERS_KEY, Some("{{not json"));
        let users = store.load().await;
        assert_eq!(users, default_users());
    }

    #[tokio::test]
    async fn users_add_rejects_empty_and_duplicate() {
        let (_dir, store) = local_store();
        assert!(!store.add_user("   ", Role::User).await);
        assert!(store.add_user("alice", Role::User).await);
        assert!(!store.add_user("alice", Role::User).await);
        // exact-match comparison is case-sensitive
        assert!(store.add_user("Alice", Role::User).await);
    }

    #[tokio::test]
    async fn users_add_initializes_empty_task_list() {
        let (_dir, store) = local_store();
        assert!(store.add_user(" alice ", Role::User).await);
        let users = store.load().await;
        assert!(users
            .iter()
            .any(|u| u.username == "alice" && u.role == Role::User));
        let board = store.tasks().load(&users).await;
        assert_eq!(board.tasks("alice"), Some(&[][..]));
    }

    #[tokio::test]
    async fn users_delete_sole_admin_is_refused() {
        let (_dir, store) = local_store();
        let before = store.load().await;
        store.delete_user(ADMIN_USERNAME).await;
        assert_eq!(store.load().await, before);
    }

    #[tokio::test]
    async fn users_delete_cascades_to_tasks() {
        let (_dir, store) = local_store();
        let users = store.load().await;
        store.tasks().assign(&users, "user1", "Write report").await;
        store.delete_user("user1").await;
        let users = store.load().await;
        assert!(!users.iter().any(|u| u.username == "user1"));
        let board = store.tasks().load(&users).await;
        assert!(!board.contains_user("user1"));
    }

    #[tokio::test]
    async fn users_set_role_keeps_last_admin() {
        let (_dir, store) = local_store();
        store.load().await;
        assert!(!store.set_role(ADMIN_USERNAME, Role::User).await);
        assert!(store.set_role("user1", Role::Admin).await);
        // with a second admin the demotion goes through
        assert!(store.set_role(ADMIN_USERNAME, Role::User).await);
    }

    #[tokio::test]
    async fn users_set_password_round_trips(){
        let (_dir, store) = local_store();
        store.load().await;
        assert!(store.set_password("user1", "new-secret").await);
        assert!(!store.set_password("ghost", "x").await);
        let users = store.load().await;
        assert!(authenticate(&users, "user1", "new-secret").is_some());
        assert!(authenticate(&users, "user1", "1234").is_none());
    }
}
