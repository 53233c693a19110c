//! Taskboard Store - the synchronization and reconciliation layer
//!
//! Loads, normalizes, mutates, and persists the user and task collections
//! across two divergent storage backends:
//! - a remote relational store (PostgREST-style REST), when configured
//! - a local blob store with a session-scoped fallback, always
//!
//! The backend is selected once at session start and injected into the
//! stores. Every remote failure degrades the affected operation to
//! local-only effect; the adapter mirror is the durability floor, and no
//! storage or backend failure ever reaches the caller as a panic.
//!
//! # Example
//!
//! ```rust,no_run
//! use taskboard_store::{BackendConfig, Tracker};
//!
//! # async fn example() {
//! let tracker = Tracker::connect(&BackendConfig::from_env(), ".taskboard");
//! let users = tracker.users().load().await;
//! let mut board = tracker.tasks().assign(&users, "user1", "Write report").await;
//! if board.set_completed("user1", 0, true).is_ok() {
//!     tracker.tasks().save(&board);
//! }
//! # }
//! ```

// Core modules
pub mod adapter;
pub mod backend;
pub mod reconcile;
pub mod session;
pub mod tasks;
pub mod tracker;
pub mod users;

// Re-exports for convenience
pub use adapter::StorageAdapter;
pub use backend::local::{LocalBackend, TASKS_KEY, USERS_KEY};
pub use backend::remote::RemoteBackend;
pub use backend::{select_backend, BackendConfig, BackendError, BackendKind, StorageBackend};
pub use reconcile::{group_rows, RemoteLeg};
pub use session::SessionStore;
pub use tasks::TaskStore;
pub use tracker::Tracker;
pub use users::{authenticate, UserStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the taskboard stores
    pub use crate::{
        BackendConfig, BackendKind, SessionStore, StorageAdapter, StorageBackend, TaskStore,
        Tracker, UserStore,
    };
    pub use taskboard_core::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
