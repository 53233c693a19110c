//! The per-user task collection and its lifecycle state machine
//!
//! A [`TaskBoard`] maps each username to an ordered task list; list order is
//! display order, and the index within a list is the addressing key for
//! mutation. Lifecycle transitions are validated here and refused with a
//! [`TransitionError`] instead of silently mutating.

use crate::task::Task;
use crate::user::User;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Why a lifecycle transition was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The addressed user has no task list
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// The index is out of range for the user's list
    #[error("no task at index {index} for user {username}")]
    NoSuchTask {
        /// Addressed user
        username: String,
        /// Addressed position
        index: usize,
    },

    /// The task has not been marked completed by the assignee
    #[error("task is not marked completed")]
    NotCompleted,

    /// The task is finalized and can no longer change state
    #[error("task is already finalized")]
    Finalized,
}

/// Username → ordered task list (insertion order is display order)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskBoard {
    entries: IndexMap<String, Vec<Task>>,
}

impl TaskBoard {
    /// Create an empty board
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the board has no users at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of users with a task list (including empty lists)
    #[inline]
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the user has a task list
    #[inline]
    #[must_use]
    pub fn contains_user(&self, username: &str) -> bool {
        self.entries.contains_key(username)
    }

    /// The user's task list, if one exists
    #[inline]
    #[must_use]
    pub fn tasks(&self, username: &str) -> Option<&[Task]> {
        self.entries.get(username).map(Vec::as_slice)
    }

    /// The task at `index` in the user's list, if both exist
    #[inline]
    #[must_use]
    pub fn task(&self, username: &str, index: usize) -> Option<&Task> {
        self.entries.get(username).and_then(|tasks| tasks.get(index))
    }

    /// Iterate users and their lists in display order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Task])> {
        self.entries
            .iter()
            .map(|(username, tasks)| (username.as_str(), tasks.as_slice()))
    }

    /// Get the user's list, creating an empty one if absent
    pub fn ensure_user(&mut self, username: &str) -> &mut Vec<Task> {
        self.entries.entry(username.to_string()).or_default()
    }

    /// Ensure every known user has at least an empty list
    pub fn ensure_all(&mut self, users: &[User]) {
        for user in users {
            self.ensure_user(&user.username);
        }
    }

    /// Remove a user's entire entry
    pub fn remove_user(&mut self, username: &str) -> Option<Vec<Task>> {
        self.entries.shift_remove(username)
    }

    /// Append a task to the user's list, creating the list if absent
    pub fn push(&mut self, username: &str, task: Task) {
        self.ensure_user(username).push(task);
    }

    /// Remove the task at `index` by structural position
    pub fn remove_at(&mut self, username: &str, index: usize) -> Option<Task> {
        let tasks = self.entries.get_mut(username)?;
        if index < tasks.len() {
            Some(tasks.remove(index))
        } else {
            None
        }
    }

    /// Set the assignee's completion flag
    ///
    /// Unchecking clears the assignee's feedback. Finalized tasks are
    /// terminal and refuse the change.
    pub fn set_completed(
        &mut self,
        username: &str,
        index: usize,
        completed: bool,
    ) -> Result<&Task, TransitionError> {
        let task = self.task_mut(username, index)?;
        if task.finalized {
            return Err(TransitionError::Finalized);
        }
        task.completed = completed;
        if !completed {
            task.feedback.clear();
        }
        Ok(task)
    }

    /// Replace the assignee's feedback text
    pub fn set_feedback(
        &mut self,
        username: &str,
        index: usize,
        feedback: impl Into<String>,
    ) -> Result<&Task, TransitionError> {
        let task = self.task_mut(username, index)?;
        if task.finalized {
            return Err(TransitionError::Finalized);
        }
        task.feedback = feedback.into();
        Ok(task)
    }

    /// Administrator confirms a completed task (terminal)
    ///
    /// Clears any pending rejection reason. Only a completed, not yet
    /// finalized task can be confirmed.
    pub fn finalize(&mut self, username: &str, index: usize) -> Result<&Task, TransitionError> {
        let task = self.task_mut(username, index)?;
        if task.finalized {
            return Err(TransitionError::Finalized);
        }
        if !task.completed {
            return Err(TransitionError::NotCompleted);
        }
        task.finalized = true;
        task.admin_feedback.clear();
        Ok(task)
    }

    /// Administrator rejects a completed task back to active state
    ///
    /// The trimmed reason lands in `admin_feedback`; the assignee's own
    /// feedback is intentionally left in place.
    pub fn return_to_user(
        &mut self,
        username: &str,
        index: usize,
        reason: &str,
    ) -> Result<&Task, TransitionError> {
        let task = self.task_mut(username, index)?;
        if task.finalized {
            return Err(TransitionError::Finalized);
        }
        if !task.completed {
            return Err(TransitionError::NotCompleted);
        }
        task.completed = false;
        task.finalized = false;
        task.admin_feedback = reason.trim().to_string();
        Ok(task)
    }

    fn task_mut(&mut self, username: &str, index: usize) -> Result<&mut Task, TransitionError> {
        let tasks = self
            .entries
            .get_mut(username)
            .ok_or_else(|| TransitionError::UnknownUser(username.to_string()))?;
        tasks.get_mut(index).ok_or(TransitionError::NoSuchTask {
            username: username.to_string(),
            index,
        })
    }
}
