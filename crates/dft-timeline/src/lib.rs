//! In-memory timeline for draft projects.
//!
//! A [`Timeline`] owns a canvas, a list of materials and a list of named,
//! kind-homogeneous tracks. Media tracks are filled by the assembly engine;
//! text, effect and filter tracks by the overlay resolver.

pub mod catalog;
pub mod error;
pub mod material;
pub mod range;
pub mod text;
pub mod timeline;
pub mod track;

pub use catalog::{EffectCatalog, EffectMeta};
pub use error::{TimelineError, TimelineResult};
pub use material::{Material, MaterialKind};
pub use range::TimeRange;
pub use text::{Color, TextBorder, TextShadow, TextSegment, TextStyle, TextStyleRange, TextTransform};
pub use timeline::{Canvas, Timeline, DEFAULT_FILTER_INTENSITY, DEFAULT_FPS};
pub use track::{EffectSegment, FilterSegment, MediaSegment, Segment, Track, TrackKind};
