//! Application state.

use std::sync::Arc;

use dft_engine::{DraftEngine, EngineConfig, TemplateRepository};
use dft_media::DurationProbe;
use dft_store::{DraftStore, StoreConfig, TaskTracker};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub drafts: Arc<DraftStore>,
    pub tasks: Arc<TaskTracker>,
    pub templates: Arc<TemplateRepository>,
    pub engine: Arc<DraftEngine>,
}

impl AppState {
    /// Wire the stores and the engine together.
    pub fn new(
        config: ApiConfig,
        store_config: StoreConfig,
        engine_config: EngineConfig,
        probe: Arc<dyn DurationProbe>,
    ) -> Self {
        let drafts = Arc::new(DraftStore::new(store_config.draft_capacity));
        let tasks = Arc::new(TaskTracker::new(store_config.task_capacity));
        let templates = Arc::new(TemplateRepository::new(&engine_config.template_dir));
        let engine = Arc::new(DraftEngine::new(
            engine_config,
            Arc::clone(&drafts),
            Arc::clone(&templates),
            probe,
        ));

        Self {
            config,
            drafts,
            tasks,
            templates,
            engine,
        }
    }

    /// Canvas size for requests that leave it unset.
    pub fn default_canvas(&self) -> (u32, u32) {
        let engine = self.engine.config();
        (engine.default_width, engine.default_height)
    }
}
