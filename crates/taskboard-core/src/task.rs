//! Task records and the legacy-shape upgrade
//!
//! The persisted store has carried several shapes over time: bare strings,
//! partial objects with missing fields, and the current canonical record.
//! Everything funnels through [`StoredTask::upgrade`] so shape repair happens
//! in exactly one place.

use serde::{Deserialize, Serialize};

/// Backend-assigned task identifier
///
/// Only present once the remote backend has accepted the row; locally
/// created tasks carry no id until an insert succeeds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current local date as ISO `YYYY-MM-DD`
#[must_use]
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Canonical task record
///
/// Serialized field names match the legacy local store (camelCase), so a
/// canonical save is readable by every historical version of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Backend row id, absent for local-only records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,
    /// Task description
    pub text: String,
    /// Marked done by the assignee
    pub completed: bool,
    /// ISO date the task was assigned
    pub assigned_date: String,
    /// ISO due date, empty when none was given
    pub due_date: String,
    /// Assignee's feedback on completion
    pub feedback: String,
    /// Administrator's rejection reason; cleared on finalize
    pub admin_feedback: String,
    /// Confirmed by the administrator (terminal)
    pub finalized: bool,
}

impl Task {
    /// Create a fresh task assigned today
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            completed: false,
            assigned_date: today(),
            due_date: String::new(),
            feedback: String::new(),
            admin_feedback: String::new(),
            finalized: false,
        }
    }

    /// With a due date
    #[inline]
    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = due_date.into();
        self
    }
}

/// Partial record as it may appear in the persisted store
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskRecord {
    /// Backend row id, if one was ever attached
    pub id: Option<TaskId>,
    /// Task description
    pub text: Option<String>,
    /// Completion flag
    pub completed: Option<bool>,
    /// Assigned date, may be missing or empty
    pub assigned_date: Option<String>,
    /// Due date
    pub due_date: Option<String>,
    /// Assignee feedback
    pub feedback: Option<String>,
    /// Administrator feedback
    pub admin_feedback: Option<String>,
    /// Finalized flag
    pub finalized: Option<bool>,
}

impl TaskRecord {
    /// Create a draft record carrying only a description and a due date
    #[must_use]
    pub fn draft(text: impl Into<String>, due_date: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            due_date: Some(due_date.into()),
            ..Self::default()
        }
    }
}

/// A persisted task in any historical shape
///
/// The oldest stores kept plain strings; later ones kept objects with a
/// varying subset of the canonical fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredTask {
    /// Pre-record shape: just the task text
    Legacy(String),
    /// Object shape with any subset of fields
    Record(TaskRecord),
}

impl StoredTask {
    /// Upgrade to the canonical shape
    ///
    /// `today` fills a missing or empty assigned date. The upgrade is
    /// idempotent: upgrading an already-canonical record changes nothing.
    #[must_use]
    pub fn upgrade(self, today: &str) -> Task {
        match self {
            StoredTask::Legacy(text) => Task {
                id: None,
                text,
                completed: false,
                assigned_date: today.to_string(),
                due_date: String::new(),
                feedback: String::new(),
                admin_feedback: String::new(),
                finalized: false,
            },
            StoredTask::Record(record) => Task {
                id: record.id,
                text: record.text.unwrap_or_default(),
                completed: record.completed.unwrap_or(false),
                assigned_date: record
                    .assigned_date
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| today.to_string()),
                due_date: record.due_date.unwrap_or_default(),
                feedback: record.feedback.unwrap_or_default(),
                admin_feedback: record.admin_feedback.unwrap_or_default(),
                finalized: record.finalized.unwrap_or(false),
            },
        }
    }
}

/// Input accepted by task assignment: a bare description or a partial draft
#[derive(Debug, Clone)]
pub enum TaskInput {
    /// Just the description
    Text(String),
    /// A partial record; missing fields are defaulted
    Draft(TaskRecord),
}

impl TaskInput {
    /// Build the task to append; any id in a draft is discarded, since
    /// assignment always creates a new record
    #[must_use]
    pub fn into_task(self, today: &str) -> Task {
        let mut task = match self {
            TaskInput::Text(text) => StoredTask::Legacy(text).upgrade(today),
            TaskInput::Draft(record) => StoredTask::Record(record).upgrade(today),
        };
        task.id = None;
        task
    }
}

impl From<&str> for TaskInput {
    fn from(text: &str) -> Self {
        TaskInput::Text(text.to_string())
    }
}

impl From<String> for TaskInput {
    fn from(text: String) -> Self {
        TaskInput::Text(text)
    }
}

impl From<TaskRecord> for TaskInput {
    fn from(record: TaskRecord) -> Self {
        TaskInput::Draft(record)
    }
}
