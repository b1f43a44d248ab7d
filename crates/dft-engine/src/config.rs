//! Engine configuration.

use std::path::PathBuf;

use dft_models::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Project skeleton copied into every materialized draft
    pub skeleton_dir: PathBuf,
    /// Directory holding template JSON files
    pub template_dir: PathBuf,
    /// Canvas width used when a request does not set one
    pub default_width: u32,
    /// Canvas height used when a request does not set one
    pub default_height: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            skeleton_dir: PathBuf::from("./template_jianying"),
            template_dir: PathBuf::from("./data/templates"),
            default_width: DEFAULT_CANVAS_WIDTH,
            default_height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            skeleton_dir: std::env::var("DRAFT_SKELETON_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.skeleton_dir),
            template_dir: std::env::var("TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_dir),
            default_width: std::env::var("DEFAULT_CANVAS_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|w| *w > 0)
                .unwrap_or(defaults.default_width),
            default_height: std::env::var("DEFAULT_CANVAS_HEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|h| *h > 0)
                .unwrap_or(defaults.default_height),
        }
    }
}
