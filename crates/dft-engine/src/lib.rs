//! Draft assembly engine.
//!
//! Scans media folders, lays the files out on a timeline (filling audio
//! overhang with images), applies a template or the built-in overlay and
//! writes the result as a draft folder. Cached drafts can also be edited
//! one segment at a time and saved on demand.

pub mod assembly;
pub mod config;
pub mod editing;
pub mod error;
pub mod logging;
pub mod materialize;
pub mod metrics;
pub mod overlay;
pub mod templates;

pub use assembly::{image_fill_durations, DraftEngine, GenerateDraftRequest, GeneratedDraft};
pub use config::EngineConfig;
pub use editing::{AddMediaRequest, DraftTarget, SaveDraftRequest, DEFAULT_IMAGE_SECS};
pub use error::{EngineError, EngineResult};
pub use logging::AssemblyLogger;
pub use materialize::{materialize_draft, DRAFT_CONTENT_FILE, DRAFT_META_FILE};
pub use overlay::{apply_overlay, default_overlay, OverlayFailure, OverlayReport};
pub use templates::TemplateRepository;
