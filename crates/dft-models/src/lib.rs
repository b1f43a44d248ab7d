//! Shared data models for the draft service.
//!
//! This crate provides Serde-serializable types for:
//! - Draft identifiers and project metadata patches
//! - The microsecond duration type used on every timeline
//! - Task status records for long-running operations
//! - Overlay templates (text, effect and filter entries)
//! - Media kinds and image crop settings

pub mod crop;
pub mod draft;
pub mod duration;
pub mod media;
pub mod task;
pub mod template;

// Re-export common types
pub use crop::CropSettings;
pub use draft::{DraftId, DraftMetaPatch, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DRAFT_ID_PREFIX};
pub use duration::Micros;
pub use media::MediaKind;
pub use task::{CounterField, Task, TaskField, TaskStatus};
pub use template::{
    EffectEntry, FilterEntry, OverlayEntry, Placement, Template, TemplateError, TemplateTracks,
    TemplateUpdate, TextEntry, TextStyleOverride, TextStyleRangeEntry, BorderOverride,
};
