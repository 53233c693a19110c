//! Taskboard Core - domain model for the task-assignment tracker
//!
//! Defines the types shared by every storage backend:
//! - User accounts and the role-defaulting rule
//! - Task records, including the legacy-shape upgrade union
//! - The per-user task board and its lifecycle state machine
//!
//! This crate is pure data: no I/O, no async, no backend knowledge.
//! Persistence and reconciliation live in `taskboard-store`.
//!
//! # Example
//!
//! ```rust
//! use taskboard_core::{Task, TaskBoard};
//!
//! let mut board = TaskBoard::new();
//! board.push("alice", Task::new("Write report"));
//! board.set_completed("alice", 0, true)?;
//! board.finalize("alice", 0)?;
//! # Ok::<(), taskboard_core::TransitionError>(())
//! ```

// Core modules
pub mod board;
pub mod task;
pub mod user;

// Re-exports for convenience
pub use board::{TaskBoard, TransitionError};
pub use task::{today, StoredTask, Task, TaskId, TaskInput, TaskRecord};
pub use user::{
    admin_count, default_users, Role, StoredUser, User, ADMIN_USERNAME, DEFAULT_PASSWORD,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the taskboard domain model
    pub use crate::{Role, Task, TaskBoard, TaskId, TaskInput, TransitionError, User};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
