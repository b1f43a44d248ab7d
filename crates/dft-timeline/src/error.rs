//! Error types for timeline operations.

use dft_models::Micros;
use thiserror::Error;

use crate::material::MaterialKind;
use crate::track::TrackKind;

/// Result type for timeline operations.
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Errors raised while editing a timeline.
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("Unknown scene effect: {0}")]
    UnknownEffect(String),

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Invalid time range: start {start}s, end {end}s")]
    InvalidRange { start: f64, end: f64 },

    #[error("Segment at {start} overlaps previous segment ending at {previous_end} on track '{track}'")]
    SegmentOverlap {
        track: String,
        start: Micros,
        previous_end: Micros,
    },

    #[error("Cannot place {material} material on a {track} track")]
    MaterialKindMismatch { track: TrackKind, material: MaterialKind },

    #[error("Track '{name}' already exists with kind {existing}")]
    TrackKindConflict { name: String, existing: TrackKind },

    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid style range {start}..{end} for text of {len} characters")]
    InvalidStyleRange { start: usize, end: usize, len: usize },

    #[error("Effect '{effect}' takes {expected} parameters, got {got}")]
    ParamCount {
        effect: String,
        expected: usize,
        got: usize,
    },

    #[error("Parameter value {value} for '{effect}' is outside 0-100")]
    ParamOutOfRange { effect: String, value: f64 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TimelineError {
    pub fn invalid_range(start: f64, end: f64) -> Self {
        Self::InvalidRange { start, end }
    }
}
