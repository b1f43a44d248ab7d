//! Editing cached drafts by id.
//!
//! Every edit resolves its draft through the store (an absent or unknown id
//! mints a new draft), applies one change under the draft's lock and hands
//! back the id to keep editing with. A rejected edit leaves an existing
//! draft untouched and discards a draft minted for it.

use std::path::PathBuf;

use dft_models::{
    CropSettings, DraftId, EffectEntry, FilterEntry, MediaKind, Micros, OverlayEntry, TextEntry,
};
use dft_timeline::{Material, MediaSegment, TimeRange, Timeline, TimelineResult, Track, TrackKind};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::assembly::DraftEngine;
use crate::error::{EngineError, EngineResult};
use crate::logging::AssemblyLogger;
use crate::materialize::materialize_draft;
use crate::metrics;
use crate::overlay::apply_entry;

/// Display length of a still image added without an explicit end.
pub const DEFAULT_IMAGE_SECS: f64 = 3.0;

/// Which draft an edit applies to, and the canvas for a newly minted one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DraftTarget {
    #[serde(default)]
    pub draft_id: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl DraftTarget {
    pub fn draft(draft_id: impl Into<String>) -> Self {
        Self {
            draft_id: Some(draft_id.into()),
            ..Self::default()
        }
    }

    fn requested_id(&self) -> Option<&str> {
        self.draft_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    fn validate(&self) -> EngineResult<()> {
        if self.width == Some(0) || self.height == Some(0) {
            return Err(EngineError::invalid_request("canvas dimensions must be positive"));
        }
        Ok(())
    }
}

/// A local media file to place on a draft.
///
/// For video and audio, `start`/`end` trim the source in seconds and `end`
/// defaults to (and is capped at) the probed duration. For images the
/// still is shown for `end - start` seconds.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddMediaRequest {
    pub media_path: PathBuf,
    pub kind: MediaKind,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: Option<f64>,
    /// Timeline position in seconds; defaults to the end of the target track
    #[serde(default)]
    pub target_start: Option<f64>,
    #[serde(default)]
    pub track_name: Option<String>,
    /// Crop applied to images
    #[serde(default)]
    pub image_crop: Option<CropSettings>,
}

impl AddMediaRequest {
    pub fn new(media_path: impl Into<PathBuf>, kind: MediaKind) -> Self {
        Self {
            media_path: media_path.into(),
            kind,
            start: 0.0,
            end: None,
            target_start: None,
            track_name: None,
            image_crop: None,
        }
    }

    fn validate(&self) -> EngineResult<()> {
        if self.media_path.as_os_str().is_empty() {
            return Err(EngineError::invalid_request("media_path is required"));
        }
        let accepted = self
            .media_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.kind.accepts_extension(ext));
        if !accepted {
            return Err(EngineError::invalid_request(format!(
                "{} is not a supported {} file",
                self.media_path.display(),
                self.kind
            )));
        }
        if !self.start.is_finite() || self.start < 0.0 {
            return Err(EngineError::invalid_request("start must be a non-negative number"));
        }
        if let Some(target) = self.target_start {
            if !target.is_finite() || target < 0.0 {
                return Err(EngineError::invalid_request(
                    "target_start must be a non-negative number",
                ));
            }
        }
        if let Some(crop) = &self.image_crop {
            if !crop.is_valid() {
                return Err(EngineError::invalid_request(
                    "image crop coordinates must be within 0..1",
                ));
            }
        }
        Ok(())
    }

    fn track_kind(&self) -> TrackKind {
        match self.kind {
            MediaKind::Audio => TrackKind::Audio,
            MediaKind::Video | MediaKind::Image => TrackKind::Video,
        }
    }
}

/// Write a cached draft to `{draft_folder}/{draft_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SaveDraftRequest {
    #[serde(default)]
    pub draft_id: String,
    #[serde(default)]
    pub draft_folder: PathBuf,
    #[serde(default)]
    pub draft_name: Option<String>,
}

impl SaveDraftRequest {
    fn validate(&self) -> EngineResult<()> {
        if self.draft_id.trim().is_empty() {
            return Err(EngineError::invalid_request("draft_id is required"));
        }
        if self.draft_folder.as_os_str().is_empty() {
            return Err(EngineError::invalid_request("draft_folder is required"));
        }
        Ok(())
    }
}

impl DraftEngine {
    /// Add a text segment. Full-duration placements span the draft as it
    /// currently stands.
    pub async fn add_text(&self, target: &DraftTarget, entry: TextEntry) -> EngineResult<DraftId> {
        self.add_overlay_entry(target, "add_text", OverlayEntry::Text(entry))
            .await
    }

    pub async fn add_effect(
        &self,
        target: &DraftTarget,
        entry: EffectEntry,
    ) -> EngineResult<DraftId> {
        self.add_overlay_entry(target, "add_effect", OverlayEntry::Effect(entry))
            .await
    }

    pub async fn add_filter(
        &self,
        target: &DraftTarget,
        entry: FilterEntry,
    ) -> EngineResult<DraftId> {
        self.add_overlay_entry(target, "add_filter", OverlayEntry::Filter(entry))
            .await
    }

    /// Place a video clip, audio track or still image on a draft.
    pub async fn add_media(
        &self,
        target: &DraftTarget,
        request: &AddMediaRequest,
    ) -> EngineResult<DraftId> {
        request.validate()?;
        let path = request.media_path.clone();
        if !fs::try_exists(&path).await? {
            return Err(EngineError::invalid_request(format!(
                "media file {} not found",
                path.display()
            )));
        }

        let (material, source) = match request.kind {
            MediaKind::Image => {
                let end = request.end.unwrap_or(request.start + DEFAULT_IMAGE_SECS);
                let shown = TimeRange::from_secs(request.start, end).map_err(EngineError::InvalidEdit)?;
                let material = Material::photo(&path, shown.duration, request.image_crop);
                (material, TimeRange::from_zero(shown.duration))
            }
            MediaKind::Video | MediaKind::Audio => {
                let duration = self.probe().duration(&path).await.map_err(|e| {
                    EngineError::invalid_request(format!("cannot read {}: {e}", path.display()))
                })?;
                let total = duration.as_secs_f64();
                let end = request.end.map_or(total, |end| end.min(total));
                let source = TimeRange::from_secs(request.start, end).map_err(EngineError::InvalidEdit)?;
                let material = match request.kind {
                    MediaKind::Audio => Material::audio(&path, duration),
                    _ => Material::video(&path, duration),
                };
                (material, source)
            }
        };

        let kind = request.track_kind();
        let track_name = request.track_name.clone();
        let target_start = request.target_start.map(Micros::from_secs_f64);
        let operation = match request.kind {
            MediaKind::Video => "add_video",
            MediaKind::Audio => "add_audio",
            MediaKind::Image => "add_image",
        };

        self.edit(target, operation, move |timeline| {
            place_material(timeline, kind, track_name.as_deref(), material, source, target_start)
        })
        .await
    }

    /// Materialize a cached draft. The draft stays in the cache.
    pub async fn save_draft(&self, request: &SaveDraftRequest) -> EngineResult<PathBuf> {
        request.validate()?;
        let timeline = self
            .drafts()
            .get(&request.draft_id)
            .ok_or_else(|| EngineError::draft_not_found(&request.draft_id))?;

        let draft_id = DraftId::from_string(&request.draft_id);
        let logger = AssemblyLogger::new(&draft_id, "save_draft");
        let content_json = timeline.lock().await.to_json_pretty()?;

        let path = materialize_draft(
            &self.config().skeleton_dir,
            &request.draft_folder,
            &draft_id,
            &content_json,
            request.draft_name.as_deref(),
        )
        .await
        .inspect_err(|e| logger.log_error(&format!("save failed: {e}")))?;

        metrics::record_draft_saved();
        logger.log_completion(&format!("saved to {}", path.display()));
        Ok(path)
    }

    async fn add_overlay_entry(
        &self,
        target: &DraftTarget,
        operation: &'static str,
        entry: OverlayEntry,
    ) -> EngineResult<DraftId> {
        let fallback_track = match &entry {
            OverlayEntry::Text(_) => TrackKind::Text,
            OverlayEntry::Effect(_) => TrackKind::Effect,
            OverlayEntry::Filter(_) => TrackKind::Filter,
        }
        .default_track_name();

        self.edit(target, operation, move |timeline| {
            let total_secs = timeline.duration().as_secs_f64();
            apply_entry(timeline, &entry, total_secs, fallback_track)
        })
        .await
    }

    /// Run one edit against the target draft.
    async fn edit<F>(
        &self,
        target: &DraftTarget,
        operation: &'static str,
        apply: F,
    ) -> EngineResult<DraftId>
    where
        F: FnOnce(&mut Timeline) -> TimelineResult<()>,
    {
        target.validate()?;
        let width = target.width.unwrap_or(self.config().default_width);
        let height = target.height.unwrap_or(self.config().default_height);
        let requested = target.requested_id();

        let (draft_id, timeline) = self.drafts().get_or_create(requested, width, height);
        let minted = requested != Some(draft_id.as_str());
        let logger = AssemblyLogger::new(&draft_id, operation);

        let result = {
            let mut timeline = timeline.lock().await;
            apply(&mut timeline)
        };

        match result {
            Ok(()) => {
                metrics::record_draft_edit(operation);
                logger.log_completion(if minted { "applied to new draft" } else { "applied" });
                Ok(draft_id)
            }
            Err(e) => {
                logger.log_warning(&format!("edit rejected: {e}"));
                if minted {
                    self.drafts().remove(draft_id.as_str());
                }
                Err(EngineError::InvalidEdit(e))
            }
        }
    }
}

/// Register `material` and place `source` of it on the track, at
/// `target_start` or the track's current end.
fn place_material(
    timeline: &mut Timeline,
    kind: TrackKind,
    track_name: Option<&str>,
    material: Material,
    source: TimeRange,
    target_start: Option<Micros>,
) -> TimelineResult<()> {
    let start = target_start.unwrap_or_else(|| {
        timeline
            .track(kind, track_name)
            .map(Track::end)
            .unwrap_or(Micros::ZERO)
    });
    let target = TimeRange::new(start, source.duration);
    let material_id = timeline.add_material(material);

    let placed = timeline.add_media_segment(
        kind,
        track_name,
        MediaSegment::new(material_id.clone(), source, target),
    );
    if placed.is_err() {
        timeline.materials.retain(|m| m.id != material_id);
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_material_appends_at_track_end() {
        let mut timeline = Timeline::new(1080, 1920);
        let clip = Micros::from_secs(2);
        for name in ["a.mp4", "b.mp4"] {
            place_material(
                &mut timeline,
                TrackKind::Video,
                None,
                Material::video(name, clip),
                TimeRange::from_zero(clip),
                None,
            )
            .unwrap();
        }
        assert_eq!(timeline.track_end(TrackKind::Video), Micros::from_secs(4));
        assert_eq!(timeline.materials.len(), 2);
    }

    #[test]
    fn test_overlapping_placement_keeps_materials_clean() {
        let mut timeline = Timeline::new(1080, 1920);
        let clip = Micros::from_secs(3);
        place_material(
            &mut timeline,
            TrackKind::Audio,
            None,
            Material::audio("a.mp3", clip),
            TimeRange::from_zero(clip),
            None,
        )
        .unwrap();

        let err = place_material(
            &mut timeline,
            TrackKind::Audio,
            None,
            Material::audio("b.mp3", clip),
            TimeRange::from_zero(clip),
            Some(Micros::from_secs(1)),
        )
        .unwrap_err();
        assert!(matches!(err, dft_timeline::TimelineError::SegmentOverlap { .. }));
        assert_eq!(timeline.materials.len(), 1);
    }

    #[test]
    fn test_media_request_validation() {
        assert!(AddMediaRequest::new("/clips/a.mp4", MediaKind::Video).validate().is_ok());
        assert!(AddMediaRequest::new("/clips/a.mp3", MediaKind::Video).validate().is_err());
        assert!(AddMediaRequest::new("", MediaKind::Image).validate().is_err());

        let mut negative = AddMediaRequest::new("/clips/a.png", MediaKind::Image);
        negative.target_start = Some(-1.0);
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_save_request_validation() {
        let request = SaveDraftRequest {
            draft_id: "dfd_cat_1".into(),
            draft_folder: "/out".into(),
            draft_name: None,
        };
        assert!(request.validate().is_ok());
        assert!(SaveDraftRequest {
            draft_folder: PathBuf::new(),
            ..request
        }
        .validate()
        .is_err());
    }
}
