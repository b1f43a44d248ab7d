//! Task tracker.
//!
//! One status record per asynchronous job, held in a bounded cache. Each
//! record has its own lock so read-modify-write updates to the same task
//! never interleave, while different tasks update independently.

use std::sync::{Arc, Mutex, MutexGuard};

use dft_models::{CounterField, Task, TaskField, TaskStatus};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::BoundedCache;

type TaskRecord = Arc<Mutex<Task>>;

fn lock(record: &TaskRecord) -> MutexGuard<'_, Task> {
    record.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Bounded store of task status records.
#[derive(Debug)]
pub struct TaskTracker {
    cache: BoundedCache<TaskRecord>,
}

impl TaskTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: BoundedCache::new("tasks", capacity),
        }
    }

    /// Create (or reset) a task in the `initialized` state.
    pub fn create(&self, task_id: &str) -> Task {
        let task = Task::new(task_id);
        self.cache.put(task_id, Arc::new(Mutex::new(task.clone())));
        info!(task_id = %task_id, "Created task");
        task
    }

    /// Run `f` on the stored record, stamping `updated_at`.
    ///
    /// Returns `false` without doing anything when the task is unknown.
    fn modify(&self, task_id: &str, f: impl FnOnce(&mut Task)) -> bool {
        let Some(record) = self.cache.get(task_id) else {
            debug!(task_id = %task_id, "Ignoring update for unknown task");
            return false;
        };
        let mut task = lock(&record);
        f(&mut task);
        task.touch();
        true
    }

    /// Set a single field.
    pub fn update_field(&self, task_id: &str, field: TaskField) -> bool {
        self.modify(task_id, |task| task.apply(field))
    }

    /// Set several fields as one update.
    pub fn update_fields(&self, task_id: &str, fields: impl IntoIterator<Item = TaskField>) -> bool {
        self.modify(task_id, |task| {
            for field in fields {
                task.apply(field);
            }
        })
    }

    /// Add `amount` to a numeric field.
    pub fn increment_field(&self, task_id: &str, field: CounterField, amount: u32) -> bool {
        self.modify(task_id, |task| task.increment(field, amount))
    }

    /// Current record, or a `not_found` record for unknown ids.
    pub fn query(&self, task_id: &str) -> Task {
        match self.cache.get(task_id) {
            Some(record) => lock(&record).clone(),
            None => Task::not_found(task_id),
        }
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.cache.contains(task_id)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Mark a task as processing.
    pub fn start(&self, task_id: &str, message: impl Into<String>) -> bool {
        let message = message.into();
        self.update_fields(
            task_id,
            [
                TaskField::Status(TaskStatus::Processing),
                TaskField::Message(message),
            ],
        )
    }

    pub fn set_progress(&self, task_id: &str, progress: u8) -> bool {
        self.update_field(task_id, TaskField::Progress(progress))
    }

    /// Mark a task as completed with an optional result payload.
    pub fn complete(&self, task_id: &str, data: Option<Value>) -> bool {
        self.modify(task_id, |task| {
            task.apply(TaskField::Status(TaskStatus::Completed));
            task.apply(TaskField::Progress(100));
            task.apply(TaskField::Message("Task completed".to_string()));
            task.apply(TaskField::Data(data));
        })
    }

    /// Mark a task as failed.
    pub fn fail(&self, task_id: &str, error: impl Into<String>) -> bool {
        let error = error.into();
        warn!(task_id = %task_id, error = %error, "Task failed");
        self.update_fields(
            task_id,
            [
                TaskField::Status(TaskStatus::Failed),
                TaskField::Message(error),
            ],
        )
    }
}
