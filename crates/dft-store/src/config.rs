//! Store configuration.

/// Capacities of the draft and task caches.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of drafts held in memory
    pub draft_capacity: usize,
    /// Maximum number of task records held in memory
    pub task_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            draft_capacity: 10_000,
            task_capacity: 1_000,
        }
    }
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            draft_capacity: std::env::var("DRAFT_CACHE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.draft_capacity),
            task_capacity: std::env::var("TASK_CACHE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.task_capacity),
        }
    }
}
