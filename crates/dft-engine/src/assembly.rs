//! Timeline assembly from local media folders.
//!
//! Videos are laid end to end on the video track and audio files on the
//! audio track. When the audio runs longer than the videos and images are
//! available, the images fill the gap after the last video, sharing it in
//! equal parts.

use std::path::PathBuf;
use std::sync::Arc;

use dft_media::{list_media_files, DurationProbe, MediaFile};
use dft_models::{CropSettings, DraftId, MediaKind, Micros, TemplateTracks};
use dft_store::{DraftStore, SharedTimeline};
use dft_timeline::{Material, TrackKind};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::logging::AssemblyLogger;
use crate::materialize::materialize_draft;
use crate::metrics;
use crate::overlay::{apply_overlay, default_overlay, OverlayReport};
use crate::templates::TemplateRepository;

/// Input of a draft generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GenerateDraftRequest {
    /// Directory of video clips
    pub video_dir: PathBuf,
    /// Directory of audio tracks
    pub audio_dir: PathBuf,
    /// Optional directory of still images used to fill audio overhang
    #[serde(default)]
    pub image_dir: Option<PathBuf>,
    /// Crop applied to every image
    #[serde(default, alias = "image_crop_settings")]
    pub image_crop: Option<CropSettings>,
    #[serde(default)]
    pub draft_name: Option<String>,
    /// Overlay template; the built-in overlay is used without one
    #[serde(default)]
    pub template_id: Option<String>,
    /// Folder the draft directory is written into
    pub draft_folder: PathBuf,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl GenerateDraftRequest {
    pub fn validate(&self) -> EngineResult<()> {
        if self.video_dir.as_os_str().is_empty() {
            return Err(EngineError::invalid_request("video_dir is required"));
        }
        if self.audio_dir.as_os_str().is_empty() {
            return Err(EngineError::invalid_request("audio_dir is required"));
        }
        if self.draft_folder.as_os_str().is_empty() {
            return Err(EngineError::invalid_request("draft_folder is required"));
        }
        if self.width == Some(0) || self.height == Some(0) {
            return Err(EngineError::invalid_request("canvas dimensions must be positive"));
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
}

/// Result of a draft generation.
#[derive(Debug, Clone)]
pub struct GeneratedDraft {
    pub draft_id: DraftId,
    pub timeline: SharedTimeline,
    /// Materialized draft directory
    pub draft_path: PathBuf,
    pub total_duration: Micros,
    /// Media files left out because their duration could not be probed
    pub skipped_files: Vec<PathBuf>,
    pub video_count: usize,
    pub audio_count: usize,
    pub image_count: usize,
    pub overlay: OverlayReport,
}

/// A media file with its probed duration.
#[derive(Debug, Clone)]
struct ProbedFile {
    path: PathBuf,
    duration: Micros,
}

/// Durations for `images` stills filling the audio overhang past the video.
///
/// Empty when there are no images or the audio is not longer than the
/// video. Otherwise every image gets an equal share of the gap and the last
/// one also takes the remainder, so the shares sum to the gap exactly.
pub fn image_fill_durations(video_total: Micros, audio_total: Micros, images: usize) -> Vec<Micros> {
    if images == 0 || audio_total <= video_total {
        return Vec::new();
    }
    audio_total.saturating_sub(video_total).split_evenly(images)
}

/// Builds draft timelines from media folders and writes them to disk.
pub struct DraftEngine {
    config: EngineConfig,
    drafts: Arc<DraftStore>,
    templates: Arc<TemplateRepository>,
    probe: Arc<dyn DurationProbe>,
}

impl DraftEngine {
    pub fn new(
        config: EngineConfig,
        drafts: Arc<DraftStore>,
        templates: Arc<TemplateRepository>,
        probe: Arc<dyn DurationProbe>,
    ) -> Self {
        Self {
            config,
            drafts,
            templates,
            probe,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn drafts(&self) -> &Arc<DraftStore> {
        &self.drafts
    }

    pub fn templates(&self) -> &Arc<TemplateRepository> {
        &self.templates
    }

    pub(crate) fn probe(&self) -> &dyn DurationProbe {
        self.probe.as_ref()
    }

    /// Generate and materialize a draft.
    pub async fn generate_draft(&self, request: &GenerateDraftRequest) -> EngineResult<GeneratedDraft> {
        request.validate()?;

        let width = request.width.unwrap_or(self.config.default_width);
        let height = request.height.unwrap_or(self.config.default_height);
        let (draft_id, timeline) = self.drafts.get_or_create(None, width, height);

        let logger = AssemblyLogger::new(&draft_id, "generate_draft");
        let span = logger.create_span();
        let cache_key = draft_id.clone();
        self.assemble(request, draft_id, timeline, logger)
            .instrument(span)
            .await
            .inspect_err(|_| {
                // The caller never learns the id of a failed draft
                self.drafts.remove(cache_key.as_str());
            })
    }

    async fn assemble(
        &self,
        request: &GenerateDraftRequest,
        draft_id: DraftId,
        timeline: SharedTimeline,
        logger: AssemblyLogger,
    ) -> EngineResult<GeneratedDraft> {
        logger.log_start(&format!(
            "video_dir={}, audio_dir={}",
            request.video_dir.display(),
            request.audio_dir.display()
        ));

        // 1. Discover media
        let videos = list_media_files(&request.video_dir, MediaKind::Video).await?;
        let audios = list_media_files(&request.audio_dir, MediaKind::Audio).await?;
        let images = match &request.image_dir {
            Some(dir) => list_media_files(dir, MediaKind::Image).await?,
            None => Vec::new(),
        };
        logger.log_progress(&format!(
            "found {} videos, {} audio files, {} images",
            videos.len(),
            audios.len(),
            images.len()
        ));

        // 2. Probe durations
        let mut skipped_files = Vec::new();
        let videos = self.probe_all(&videos, &logger, &mut skipped_files).await;
        let audios = self.probe_all(&audios, &logger, &mut skipped_files).await;
        let video_total: Micros = videos.iter().map(|f| f.duration).sum();
        let audio_total: Micros = audios.iter().map(|f| f.duration).sum();

        // 3. Gap fill
        let image_durations = image_fill_durations(video_total, audio_total, images.len());
        if !images.is_empty() && image_durations.is_empty() {
            logger.log_progress("audio does not outlast video, images not used");
        }

        let template = self.resolve_template(request.template_id.as_deref(), &logger).await;

        // 4-7. Build the timeline; serialize before releasing the lock
        let (total_duration, overlay, content_json) = {
            let mut timeline = timeline.lock().await;

            for video in &videos {
                timeline.append_material(
                    TrackKind::Video,
                    Material::video(&video.path, video.duration),
                )?;
            }
            for (image, duration) in images.iter().zip(&image_durations) {
                timeline.append_material(
                    TrackKind::Video,
                    Material::photo(&image.path, *duration, request.image_crop),
                )?;
            }
            for audio in &audios {
                timeline.append_material(
                    TrackKind::Audio,
                    Material::audio(&audio.path, audio.duration),
                )?;
            }

            let total = timeline
                .track_end(TrackKind::Video)
                .max(timeline.track_end(TrackKind::Audio));

            // The built-in overlay only goes on non-empty timelines
            let report = match template {
                Some(tracks) => apply_overlay(&mut timeline, &tracks, total),
                None if !total.is_zero() => apply_overlay(&mut timeline, &default_overlay(), total),
                None => OverlayReport::default(),
            };
            if !report.is_clean() {
                logger.log_warning(&format!("{} overlay entries skipped", report.failed));
            }

            (total, report, timeline.to_json_pretty()?)
        };

        // 8. Materialize
        let draft_path = materialize_draft(
            &self.config.skeleton_dir,
            &request.draft_folder,
            &draft_id,
            &content_json,
            request.draft_name.as_deref(),
        )
        .await
        .inspect_err(|e| logger.log_error(&format!("materialization failed: {e}")))?;

        metrics::record_draft_generated();
        logger.log_completion(&format!(
            "total {} written to {}",
            total_duration,
            draft_path.display()
        ));

        Ok(GeneratedDraft {
            draft_id,
            timeline,
            draft_path,
            total_duration,
            skipped_files,
            video_count: videos.len(),
            audio_count: audios.len(),
            image_count: image_durations.len(),
            overlay,
        })
    }

    /// Probe each file, skipping (and recording) those that fail.
    async fn probe_all(
        &self,
        files: &[MediaFile],
        logger: &AssemblyLogger,
        skipped: &mut Vec<PathBuf>,
    ) -> Vec<ProbedFile> {
        let mut probed = Vec::with_capacity(files.len());
        for file in files {
            match self.probe.duration(&file.path).await {
                Ok(duration) if !duration.is_zero() => probed.push(ProbedFile {
                    path: file.path.clone(),
                    duration,
                }),
                Ok(_) => {
                    logger.log_warning(&format!("skipping {}: zero duration", file.path.display()));
                    metrics::record_probe_failure(file.kind.as_str());
                    skipped.push(file.path.clone());
                }
                Err(e) => {
                    logger.log_warning(&format!("skipping {}: {}", file.path.display(), e));
                    metrics::record_probe_failure(file.kind.as_str());
                    skipped.push(file.path.clone());
                }
            }
        }
        probed
    }

    /// Entries of the requested template, or `None` when the built-in
    /// overlay should be used instead.
    async fn resolve_template(
        &self,
        template_id: Option<&str>,
        logger: &AssemblyLogger,
    ) -> Option<TemplateTracks> {
        let id = template_id.filter(|id| !id.trim().is_empty())?;
        match self.templates.get(id).await {
            Ok(Some(template)) => {
                logger.log_progress(&format!("applying template '{}'", template.name));
                Some(template.tracks)
            }
            Ok(None) => {
                logger.log_warning(&format!("template {id} not found, using default overlay"));
                None
            }
            Err(e) => {
                logger.log_warning(&format!("template {id} unreadable ({e}), using default overlay"));
                None
            }
        }
    }
}

impl std::fmt::Debug for DraftEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
