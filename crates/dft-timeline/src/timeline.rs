//! The in-memory editing timeline.

use dft_models::Micros;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::EffectCatalog;
use crate::error::{TimelineError, TimelineResult};
use crate::material::{Material, MaterialKind};
use crate::range::TimeRange;
use crate::text::TextSegment;
use crate::track::{EffectSegment, FilterSegment, MediaSegment, Segment, Track, TrackKind};

/// Frame rate written into every timeline.
pub const DEFAULT_FPS: u32 = 30;

/// Filter strength used when a filter entry leaves it unset.
pub const DEFAULT_FILTER_INTENSITY: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

/// A draft project under construction: canvas, materials and tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub canvas: Canvas,
    pub fps: u32,
    pub materials: Vec<Material>,
    pub tracks: Vec<Track>,
    #[serde(skip)]
    catalog: EffectCatalog,
}

impl Timeline {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Canvas { width, height },
            fps: DEFAULT_FPS,
            materials: Vec::new(),
            tracks: Vec::new(),
            catalog: EffectCatalog,
        }
    }

    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    /// Return the track with the given name, creating it if absent.
    ///
    /// Without a name the kind's default track is used, so repeated calls
    /// for the same kind always land on the same track.
    pub fn get_or_create_track(
        &mut self,
        kind: TrackKind,
        name: Option<&str>,
    ) -> TimelineResult<&mut Track> {
        let name = name.unwrap_or_else(|| kind.default_track_name());
        match self.tracks.iter().position(|t| t.name == name) {
            Some(index) => {
                let track = &mut self.tracks[index];
                if track.kind != kind {
                    return Err(TimelineError::TrackKindConflict {
                        name: name.to_string(),
                        existing: track.kind,
                    });
                }
                Ok(track)
            }
            None => {
                self.tracks.push(Track::new(kind, name));
                let last = self.tracks.len() - 1;
                Ok(&mut self.tracks[last])
            }
        }
    }

    pub fn track(&self, kind: TrackKind, name: Option<&str>) -> Option<&Track> {
        let name = name.unwrap_or_else(|| kind.default_track_name());
        self.tracks.iter().find(|t| t.kind == kind && t.name == name)
    }

    pub fn tracks_of(&self, kind: TrackKind) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(move |t| t.kind == kind)
    }

    /// Register a material; a material with the same id is stored once.
    pub fn add_material(&mut self, material: Material) -> String {
        let id = material.id.clone();
        if self.material(&id).is_none() {
            self.materials.push(material);
        }
        id
    }

    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Place a media segment on a media track.
    pub fn add_media_segment(
        &mut self,
        kind: TrackKind,
        track_name: Option<&str>,
        segment: MediaSegment,
    ) -> TimelineResult<()> {
        let material_kind = self
            .material(&segment.material_id)
            .map(|m| m.kind)
            .ok_or_else(|| TimelineError::UnknownMaterial(segment.material_id.clone()))?;
        check_material_kind(kind, material_kind)?;
        self.get_or_create_track(kind, track_name)?
            .push(Segment::Media(segment))
    }

    /// Append a whole material at the current end of the kind's default
    /// track. Returns the target range it was placed at.
    pub fn append_material(
        &mut self,
        kind: TrackKind,
        material: Material,
    ) -> TimelineResult<TimeRange> {
        check_material_kind(kind, material.kind)?;
        let start = self.get_or_create_track(kind, None)?.end();
        let source = TimeRange::from_zero(material.duration);
        let target = TimeRange::new(start, material.duration);
        let material_id = self.add_material(material);
        self.add_media_segment(kind, None, MediaSegment::new(material_id, source, target))?;
        Ok(target)
    }

    pub fn add_text(&mut self, segment: TextSegment, track_name: Option<&str>) -> TimelineResult<()> {
        self.get_or_create_track(TrackKind::Text, track_name)?
            .push(Segment::Text(segment))
    }

    /// Add a catalog scene effect.
    ///
    /// Parameters are 0-100 and follow the effect's declared order; fewer
    /// than declared is fine.
    pub fn add_effect(
        &mut self,
        name: &str,
        range: TimeRange,
        params: &[f64],
        track_name: Option<&str>,
    ) -> TimelineResult<()> {
        let meta = self
            .catalog
            .scene_effect(name)
            .ok_or_else(|| TimelineError::UnknownEffect(name.to_string()))?;
        if params.len() > meta.params.len() {
            return Err(TimelineError::ParamCount {
                effect: name.to_string(),
                expected: meta.params.len(),
                got: params.len(),
            });
        }
        if let Some(&value) = params.iter().find(|v| !(0.0..=100.0).contains(*v)) {
            return Err(TimelineError::ParamOutOfRange {
                effect: name.to_string(),
                value,
            });
        }
        let segment = EffectSegment {
            id: Uuid::new_v4().simple().to_string(),
            name: meta.name.to_string(),
            resource_id: meta.resource_id.to_string(),
            params: params.to_vec(),
            target_range: range,
        };
        self.get_or_create_track(TrackKind::Effect, track_name)?
            .push(Segment::Effect(segment))
    }

    /// Add a catalog filter at the given strength (default 100).
    pub fn add_filter(
        &mut self,
        name: &str,
        range: TimeRange,
        intensity: Option<f64>,
        track_name: Option<&str>,
    ) -> TimelineResult<()> {
        let meta = self
            .catalog
            .filter(name)
            .ok_or_else(|| TimelineError::UnknownFilter(name.to_string()))?;
        let intensity = intensity.unwrap_or(DEFAULT_FILTER_INTENSITY);
        if !(0.0..=100.0).contains(&intensity) {
            return Err(TimelineError::ParamOutOfRange {
                effect: name.to_string(),
                value: intensity,
            });
        }
        let segment = FilterSegment {
            id: Uuid::new_v4().simple().to_string(),
            name: meta.name.to_string(),
            resource_id: meta.resource_id.to_string(),
            intensity,
            target_range: range,
        };
        self.get_or_create_track(TrackKind::Filter, track_name)?
            .push(Segment::Filter(segment))
    }

    /// End of the kind's default track.
    pub fn track_end(&self, kind: TrackKind) -> Micros {
        self.track(kind, None).map(Track::end).unwrap_or(Micros::ZERO)
    }

    /// End of the longest track.
    pub fn duration(&self) -> Micros {
        self.tracks.iter().map(Track::end).max().unwrap_or(Micros::ZERO)
    }

    pub fn to_json(&self) -> TimelineResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> TimelineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> TimelineResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn check_material_kind(track: TrackKind, material: MaterialKind) -> TimelineResult<()> {
    let ok = matches!(
        (track, material),
        (TrackKind::Video, MaterialKind::Video)
            | (TrackKind::Video, MaterialKind::Photo)
            | (TrackKind::Audio, MaterialKind::Audio)
    );
    if ok {
        Ok(())
    } else {
        Err(TimelineError::MaterialKindMismatch { track, material })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Micros {
        Micros::from_secs(s)
    }

    #[test]
    fn test_get_or_create_track_is_idempotent() {
        let mut timeline = Timeline::new(1080, 1920);
        let first = timeline.get_or_create_track(TrackKind::Video, None).unwrap().id.clone();
        let second = timeline.get_or_create_track(TrackKind::Video, None).unwrap().id.clone();
        assert_eq!(first, second);
        assert_eq!(timeline.tracks.len(), 1);

        timeline.get_or_create_track(TrackKind::Audio, None).unwrap();
        assert_eq!(timeline.tracks.len(), 2);
    }

    #[test]
    fn test_track_kind_conflict() {
        let mut timeline = Timeline::new(1080, 1920);
        timeline.get_or_create_track(TrackKind::Text, Some("shared")).unwrap();
        let err = timeline
            .get_or_create_track(TrackKind::Filter, Some("shared"))
            .unwrap_err();
        assert!(matches!(err, TimelineError::TrackKindConflict { .. }));
    }

    #[test]
    fn test_append_material_is_contiguous() {
        let mut timeline = Timeline::new(1080, 1920);
        let a = timeline
            .append_material(TrackKind::Video, Material::video("/v/a.mp4", secs(3)))
            .unwrap();
        let b = timeline
            .append_material(TrackKind::Video, Material::photo("/i/b.png", secs(2), None))
            .unwrap();

        assert_eq!(a.start, Micros::ZERO);
        assert_eq!(b.start, a.end());
        assert_eq!(timeline.track_end(TrackKind::Video), secs(5));
        assert_eq!(timeline.materials.len(), 2);
    }

    #[test]
    fn test_material_kind_mismatch() {
        let mut timeline = Timeline::new(1080, 1920);
        let err = timeline
            .append_material(TrackKind::Audio, Material::video("/v/a.mp4", secs(1)))
            .unwrap_err();
        assert!(matches!(err, TimelineError::MaterialKindMismatch { .. }));
        assert!(timeline.materials.is_empty());
    }

    #[test]
    fn test_overlapping_segment_rejected() {
        let mut timeline = Timeline::new(1080, 1920);
        let range = TimeRange::from_secs(0.0, 5.0).unwrap();
        timeline.add_filter("高清", range, None, None).unwrap();
        let err = timeline.add_filter("清晰", range, None, None).unwrap_err();
        assert!(matches!(err, TimelineError::SegmentOverlap { .. }));

        // A separate track is fine.
        timeline.add_filter("清晰", range, None, Some("filter_2")).unwrap();
    }

    #[test]
    fn test_unknown_effect_and_filter() {
        let mut timeline = Timeline::new(1080, 1920);
        let range = TimeRange::from_secs(0.0, 1.0).unwrap();
        assert!(matches!(
            timeline.add_effect("nope", range, &[], None),
            Err(TimelineError::UnknownEffect(_))
        ));
        assert!(matches!(
            timeline.add_filter("nope", range, None, None),
            Err(TimelineError::UnknownFilter(_))
        ));
        assert!(timeline.tracks.is_empty());
    }

    #[test]
    fn test_effect_params_validated() {
        let mut timeline = Timeline::new(1080, 1920);
        let range = TimeRange::from_secs(0.0, 1.0).unwrap();
        assert!(timeline.add_effect("模糊", range, &[50.0, 50.0], None).is_err());
        assert!(timeline.add_effect("模糊", range, &[150.0], None).is_err());
        timeline.add_effect("模糊", range, &[40.0], None).unwrap();
    }

    #[test]
    fn test_duration_and_json() {
        let mut timeline = Timeline::new(720, 1280);
        timeline
            .append_material(TrackKind::Audio, Material::audio("/a/song.mp3", secs(7)))
            .unwrap();
        timeline
            .add_text(
                TextSegment::new("hi", TimeRange::from_secs(0.0, 2.0).unwrap()),
                None,
            )
            .unwrap();
        assert_eq!(timeline.duration(), secs(7));

        let value = timeline.to_value().unwrap();
        assert_eq!(value["canvas"]["width"], 720);
        assert_eq!(value["tracks"][1]["segments"][0]["type"], "text");

        let parsed: Timeline = serde_json::from_str(&timeline.to_json().unwrap()).unwrap();
        assert_eq!(parsed.tracks.len(), 2);
    }
}
