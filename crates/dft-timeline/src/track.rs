//! Tracks and the segments placed on them.

use std::fmt;

use dft_models::Micros;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TimelineError, TimelineResult};
use crate::range::TimeRange;
use crate::text::TextSegment;

/// Kind of a track. Every segment on a track matches its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Video,
    Audio,
    Text,
    Effect,
    Filter,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
            TrackKind::Text => "text",
            TrackKind::Effect => "effect",
            TrackKind::Filter => "filter",
        }
    }

    /// Name given to a track created without an explicit name.
    pub fn default_track_name(&self) -> &'static str {
        match self {
            TrackKind::Video => "video_main",
            TrackKind::Audio => "audio_main",
            TrackKind::Text => "text_main",
            TrackKind::Effect => "effect_main",
            TrackKind::Filter => "filter_main",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A placed occurrence of a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSegment {
    pub id: String,
    pub material_id: String,
    /// Portion of the material that is used
    pub source_range: TimeRange,
    /// Position on the timeline
    pub target_range: TimeRange,
}

impl MediaSegment {
    pub fn new(material_id: impl Into<String>, source_range: TimeRange, target_range: TimeRange) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            material_id: material_id.into(),
            source_range,
            target_range,
        }
    }
}

/// A scene effect occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSegment {
    pub id: String,
    pub name: String,
    pub resource_id: String,
    pub params: Vec<f64>,
    pub target_range: TimeRange,
}

/// A filter occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSegment {
    pub id: String,
    pub name: String,
    pub resource_id: String,
    pub intensity: f64,
    pub target_range: TimeRange,
}

/// Anything that can sit on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Media(MediaSegment),
    Text(TextSegment),
    Effect(EffectSegment),
    Filter(FilterSegment),
}

impl Segment {
    pub fn target_range(&self) -> &TimeRange {
        match self {
            Segment::Media(s) => &s.target_range,
            Segment::Text(s) => &s.target_range,
            Segment::Effect(s) => &s.target_range,
            Segment::Filter(s) => &s.target_range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub kind: TrackKind,
    pub name: String,
    pub segments: Vec<Segment>,
}

impl Track {
    pub fn new(kind: TrackKind, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            kind,
            name: name.into(),
            segments: Vec::new(),
        }
    }

    /// End of the last segment, or zero for an empty track.
    pub fn end(&self) -> Micros {
        self.segments
            .iter()
            .map(|s| s.target_range().end())
            .max()
            .unwrap_or(Micros::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a segment. Segments must be added in ascending,
    /// non-overlapping order.
    pub(crate) fn push(&mut self, segment: Segment) -> TimelineResult<()> {
        let previous_end = self.end();
        let start = segment.target_range().start;
        if start < previous_end {
            return Err(TimelineError::SegmentOverlap {
                track: self.name.clone(),
                start,
                previous_end,
            });
        }
        self.segments.push(segment);
        Ok(())
    }

    /// Media segments in placement order.
    pub fn media_segments(&self) -> impl Iterator<Item = &MediaSegment> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Media(m) => Some(m),
            _ => None,
        })
    }
}
