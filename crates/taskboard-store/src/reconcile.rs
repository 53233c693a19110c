//! Dual-write reconciliation rules
//!
//! Every mutation has a remote leg and a local leg. The remote leg may be
//! absent (nothing addressable remotely yet) or may fail; either way the
//! local leg proceeds and the operation reports success. Remote ids attach
//! to locally created records only from an applied insert, never guessed.

use crate::backend::BackendError;
use taskboard_core::{Task, TaskBoard, User};

/// Outcome of the remote half of a dual write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteLeg<T> {
    /// The backend applied the operation
    Applied(T),
    /// Nothing for the backend to do (e.g. no id attached yet)
    Skipped,
    /// The backend failed; the operation carries on with local-only effect
    Degraded,
}

impl<T> RemoteLeg<T> {
    /// The applied value, if the leg reached the backend
    #[inline]
    pub fn applied(self) -> Option<T> {
        match self {
            RemoteLeg::Applied(value) => Some(value),
            RemoteLeg::Skipped | RemoteLeg::Degraded => None,
        }
    }

    /// Check whether the leg failed
    #[inline]
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, RemoteLeg::Degraded)
    }
}

/// Classify a backend call result, logging the degraded case
pub(crate) fn classify<T>(operation: &str, result: Result<T, BackendError>) -> RemoteLeg<T> {
    match result {
        Ok(value) => RemoteLeg::Applied(value),
        Err(error) => {
            tracing::warn!("{operation} degraded to local-only effect: {error}");
            RemoteLeg::Degraded
        }
    }
}

/// Group task rows by username with `users` as the key universe
///
/// Every known user gets at least an empty list, in user-list order; rows
/// for usernames outside the universe keep their own entry rather than
/// being dropped.
#[must_use]
pub fn group_rows(users: &[User], rows: Vec<(String, Task)>) -> TaskBoard {
    let mut board = TaskBoard::new();
    board.ensure_all(users);
    for (username, task) in rows {
        board.push(&username, task);
    }
    board
}
