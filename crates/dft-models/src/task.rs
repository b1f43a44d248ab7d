//! Task status records for progress tracking and polling.
//!
//! A task is a caller-driven state machine: `initialized` on creation,
//! then `processing`, then one of the terminal states `completed` or
//! `failed`. Nothing here infers transitions; callers set them.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message stored on freshly created tasks.
pub const TASK_INITIALIZED_MESSAGE: &str = "Task initialized";

/// Message of the synthesized record for unknown task ids.
pub const TASK_NOT_FOUND_MESSAGE: &str = "Task does not exist";

/// Status record for one asynchronous job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Task {
    /// Caller-supplied task identifier
    pub task_id: String,
    /// Current task status
    pub status: TaskStatus,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Human readable status message
    pub message: String,
    /// Number of files processed so far
    pub completed_files: u32,
    /// Total number of files to process
    pub total_files: u32,
    /// Link to the resulting draft, once known
    pub draft_url: String,
    /// Opaque result payload
    pub data: Option<Value>,
    /// When the task was created
    pub created_at: DateTime<Utc>,
    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Task processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task was created and has not started
    #[default]
    Initialized,
    /// Task is actively being processed
    Processing,
    /// Task completed successfully
    Completed,
    /// Task failed with an error
    Failed,
    /// No task with the requested id exists (never stored)
    NotFound,
}

impl TaskStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Initialized => "initialized",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::NotFound => "not_found",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single field assignment on a task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum TaskField {
    Status(TaskStatus),
    Progress(u8),
    Message(String),
    CompletedFiles(u32),
    TotalFiles(u32),
    DraftUrl(String),
    Data(Option<Value>),
}

/// Numeric task fields that support increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CounterField {
    Progress,
    CompletedFiles,
    TotalFiles,
}

impl Task {
    /// Create a new task in the `initialized` state.
    pub fn new(task_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Initialized,
            progress: 0,
            message: TASK_INITIALIZED_MESSAGE.to_string(),
            completed_files: 0,
            total_files: 0,
            draft_url: String::new(),
            data: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Synthesized record returned for unknown task ids.
    pub fn not_found(task_id: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::NotFound,
            message: TASK_NOT_FOUND_MESSAGE.to_string(),
            ..Self::new(task_id)
        }
    }

    /// Check if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Assign one field. Does not touch `updated_at`.
    pub fn apply(&mut self, field: TaskField) {
        match field {
            TaskField::Status(status) => self.status = status,
            TaskField::Progress(progress) => self.progress = progress.min(100),
            TaskField::Message(message) => self.message = message,
            TaskField::CompletedFiles(n) => self.completed_files = n,
            TaskField::TotalFiles(n) => self.total_files = n,
            TaskField::DraftUrl(url) => self.draft_url = url,
            TaskField::Data(data) => self.data = data,
        }
    }

    /// Add `amount` to a numeric field. Progress saturates at 100.
    pub fn increment(&mut self, field: CounterField, amount: u32) {
        match field {
            CounterField::Progress => {
                let next = (self.progress as u32).saturating_add(amount).min(100);
                self.progress = next as u8;
            }
            CounterField::CompletedFiles => {
                self.completed_files = self.completed_files.saturating_add(amount)
            }
            CounterField::TotalFiles => self.total_files = self.total_files.saturating_add(amount),
        }
    }

    /// Bump the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
