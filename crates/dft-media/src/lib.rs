//! Local media handling for draft assembly.
//!
//! This crate provides:
//! - Directory scanning with per-kind extension allow-lists
//! - Duration probing behind the [`DurationProbe`] trait (ffprobe-backed)
//! - Filesystem helpers for copying and writing draft folders

pub mod error;
pub mod fs_utils;
pub mod probe;
pub mod scan;

pub use error::{MediaError, MediaResult};
pub use probe::{probe_media, DurationProbe, FfprobeDurationProbe, FixedDurationProbe, MediaInfo};
pub use scan::{list_media_files, MediaFile};
