//! Remote relational backend
//!
//! A PostgREST-style REST client over two tables, `users` and `tasks`.
//! This module owns the wire mapping: camelCase in-memory fields ↔
//! snake_case columns (the admin feedback column is spelled
//! `adminfeedback`), and empty strings ↔ SQL NULL, applied on every
//! boundary crossing in both directions.

use super::{BackendError, BackendKind, StorageBackend};
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use taskboard_core::{today, StoredTask, StoredUser, Task, TaskId, TaskRecord, User};

const USERS_TABLE: &str = "users";
const TASKS_TABLE: &str = "tasks";

/// Client for the hosted relational store
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    http: reqwest::Client,
    rest_url: String,
    api_key: String,
}

impl RemoteBackend {
    /// Build a client for the store at `url`
    ///
    /// # Errors
    /// Any HTTP client construction failure; the caller degrades selection
    /// to local storage.
    pub fn connect(url: &str, api_key: &str) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            rest_url: format!("{}/rest/v1", url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }

    fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl StorageBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn select_users(&self) -> Result<Vec<User>, BackendError> {
        let response = self
            .request(Method::GET, USERS_TABLE)
            .query(&[("select", "*")])
            .send()
            .await?;
        let rows: Vec<StoredUser> = Self::ensure_success(response).await?.json().await?;
        Ok(rows.into_iter().map(StoredUser::normalize).collect())
    }

    async fn insert_users(&self, users: &[User]) -> Result<(), BackendError> {
        let rows: Vec<UserRow<'_>> = users.iter().map(UserRow::from).collect();
        let response = self
            .request(Method::POST, USERS_TABLE)
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn upsert_users(&self, users: &[User]) -> Result<(), BackendError> {
        let rows: Vec<UserRow<'_>> = users.iter().map(UserRow::from).collect();
        let response = self
            .request(Method::POST, USERS_TABLE)
            .query(&[("on_conflict", "username")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&rows)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> Result<(), BackendError> {
        let response = self
            .request(Method::DELETE, USERS_TABLE)
            .query(&[("username", format!("eq.{username}"))])
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn select_tasks(&self) -> Result<Vec<(String, Task)>, BackendError> {
        let response = self
            .request(Method::GET, TASKS_TABLE)
            .query(&[("select", "*")])
            .send()
            .await?;
        let rows: Vec<TaskRowIn> = Self::ensure_success(response).await?.json().await?;
        let today = today();
        Ok(rows.into_iter().map(|row| row.into_task(&today)).collect())
    }

    async fn insert_task(
        &self,
        username: &str,
        task: &Task,
    ) -> Result<Option<TaskId>, BackendError> {
        let response = self
            .request(Method::POST, TASKS_TABLE)
            .header("Prefer", "return=representation")
            .json(&[TaskRowOut::new(username, task)])
            .send()
            .await?;
        let rows: Vec<TaskRowIn> = Self::ensure_success(response).await?.json().await?;
        Ok(rows.first().and_then(|row| row.id).map(TaskId))
    }

    async fn update_task(&self, task: &Task) -> Result<(), BackendError> {
        let Some(id) = task.id else {
            return Ok(());
        };
        let response = self
            .request(Method::PATCH, TASKS_TABLE)
            .query(&[("id", format!("eq.{id}"))])
            .json(&TaskPatch::new(task))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), BackendError> {
        let response = self
            .request(Method::DELETE, TASKS_TABLE)
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// Empty strings are stored as NULL
fn nullable(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// users row as written to the backend
#[derive(Debug, Serialize)]
struct UserRow<'a> {
    username: &'a str,
    password: &'a str,
    role: &'a str,
}

impl<'a> From<&'a User> for UserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            username: &user.username,
            password: &user.password,
            role: user.role.as_str(),
        }
    }
}

/// tasks row as read from the backend
#[derive(Debug, Deserialize)]
struct TaskRowIn {
    #[serde(default)]
    id: Option<i64>,
    username: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default)]
    assigned_date: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    feedback: Option<String>,
    #[serde(default)]
    adminfeedback: Option<String>,
    #[serde(default)]
    finalized: Option<bool>,
}

impl TaskRowIn {
    /// Map into the canonical shape through the shared upgrade path
    fn into_task(self, today: &str) -> (String, Task) {
        let TaskRowIn {
            id,
            username,
            text,
            completed,
            assigned_date,
            due_date,
            feedback,
            adminfeedback,
            finalized,
        } = self;
        let record = TaskRecord {
            id: id.map(TaskId),
            text,
            completed,
            assigned_date,
            due_date,
            feedback,
            admin_feedback: adminfeedback,
            finalized,
        };
        (username, StoredTask::Record(record).upgrade(today))
    }
}

/// tasks row as written to the backend
#[derive(Debug, Serialize)]
struct TaskRowOut<'a> {
    username: &'a str,
    text: &'a str,
    completed: bool,
    assigned_date: &'a str,
    due_date: Option<&'a str>,
    feedback: Option<&'a str>,
    adminfeedback: Option<&'a str>,
    finalized: bool,
}

impl<'a> TaskRowOut<'a> {
    fn new(username: &'a str, task: &'a Task) -> Self {
        Self {
            username,
            text: &task.text,
            completed: task.completed,
            assigned_date: &task.assigned_date,
            due_date: nullable(&task.due_date),
            feedback: nullable(&task.feedback),
            adminfeedback: nullable(&task.admin_feedback),
            finalized: task.finalized,
        }
    }
}

/// Full-row update body; the owning username never changes
#[derive(Debug, Serialize)]
struct TaskPatch<'a> {
    text: &'a str,
    completed: bool,
    assigned_date: &'a str,
    due_date: Option<&'a str>,
    feedback: Option<&'a str>,
    adminfeedback: Option<&'a str>,
    finalized: bool,
}

impl<'a> TaskPatch<'a> {
    fn new(task: &'a Task) -> Self {
        Self {
            text: &task.text,
            completed: task.completed,
            assigned_date: &task.assigned_date,
            due_date: nullable(&task.due_date),
            feedback: nullable(&task.feedback),
            adminfeedback: nullable(&task.admin_feedback),
            finalized: task.finalized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn task_row_out_maps_empty_strings_to_null() {
        let task = Task::new("Write report");
        let raw = serde_json::to_string(&TaskRowOut::new("alice", &task)).unwrap();
        assert!(raw.contains(r#""due_date":null"#));
        assert!(raw.contains(r#""feedback":null"#));
        assert!(raw.contains(r#""adminfeedback":null"#));
        assert!(raw.contains(r#""username":"alice""#));
        assert!(raw.contains(r#""assigned_date""#));
    }

    #[test]
    fn task_row_in_maps_columns_back_to_camel_case_shape() {
        let raw = r#"{
            "id": 42,
            "username": "alice",
            "text": "Write report",
            "completed": true,
            "assigned_date": "2025-05-20",
            "due_date": null,
            "feedback": "done",
            "adminfeedback": null,
            "finalized": false
        }"#;
        let row: TaskRowIn = serde_json::from_str(raw).unwrap();
        let (username, task) = row.into_task("2025-06-01");
        assert_eq!(username, "alice");
        assert_eq!(task.id, Some(TaskId(42)));
        assert_eq!(task.assigned_date, "2025-05-20");
        assert_eq!(task.due_date, "");
        assert_eq!(task.feedback, "done");
        assert_eq!(task.admin_feedback, "");
        assert!(!task.finalized);
    }

    #[test]
    fn user_row_carries_role_spelling() {
        let user = User::new("admin", "admin", taskboard_core::Role::Admin);
        let raw = serde_json::to_string(&UserRow::from(&user)).unwrap();
        assert_eq!(
            raw,
            r#"{"username":"admin","password":"admin","role":"admin"}"#
        );
    }
}
