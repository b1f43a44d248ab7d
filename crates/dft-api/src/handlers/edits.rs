//! Draft editing handlers: segments added by draft id, saving and the
//! effect catalog.

use std::path::PathBuf;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use dft_engine::{AddMediaRequest, DraftTarget, SaveDraftRequest};
use dft_models::{CropSettings, EffectEntry, FilterEntry, MediaKind, TextEntry};
use dft_timeline::{EffectCatalog, EffectMeta};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::envelope::{ok, Envelope};
use crate::error::{ApiError, ApiResult};
use crate::handlers::drafts::DraftLink;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddTextRequest {
    #[serde(flatten)]
    pub target: DraftTarget,
    #[serde(flatten)]
    pub text: TextEntry,
}

#[derive(Debug, Deserialize)]
pub struct AddEffectRequest {
    #[serde(flatten)]
    pub target: DraftTarget,
    #[serde(flatten)]
    pub effect: EffectEntry,
}

#[derive(Debug, Deserialize)]
pub struct AddFilterRequest {
    #[serde(flatten)]
    pub target: DraftTarget,
    #[serde(flatten)]
    pub filter: FilterEntry,
}

/// Body shared by the video, audio and image endpoints; the route picks
/// the media kind.
#[derive(Debug, Deserialize)]
pub struct AddMediaBody {
    #[serde(flatten)]
    pub target: DraftTarget,
    #[serde(default)]
    pub media_path: PathBuf,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub target_start: Option<f64>,
    #[serde(default)]
    pub track_name: Option<String>,
    #[serde(default, alias = "image_crop_settings")]
    pub image_crop: Option<CropSettings>,
}

impl AddMediaBody {
    fn into_request(self, kind: MediaKind) -> (DraftTarget, AddMediaRequest) {
        let request = AddMediaRequest {
            media_path: self.media_path,
            kind,
            start: self.start,
            end: self.end,
            target_start: self.target_start,
            track_name: self.track_name,
            image_crop: self.image_crop,
        };
        (self.target, request)
    }
}

fn draft_link(state: &AppState, draft_id: &str) -> Json<Envelope<DraftLink>> {
    ok(DraftLink {
        draft_id: draft_id.to_string(),
        draft_url: state.config.draft_url(draft_id),
    })
}

pub async fn add_text(
    State(state): State<AppState>,
    payload: Result<Json<AddTextRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<DraftLink>>> {
    let Json(body) = payload?;
    if body.text.text.is_empty() {
        return Err(ApiError::missing_field("text"));
    }
    let draft_id = state.engine.add_text(&body.target, body.text).await?;
    Ok(draft_link(&state, draft_id.as_str()))
}

pub async fn add_effect(
    State(state): State<AppState>,
    payload: Result<Json<AddEffectRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<DraftLink>>> {
    let Json(body) = payload?;
    if body.effect.effect_type.is_empty() {
        return Err(ApiError::missing_field("effect_type"));
    }
    let draft_id = state.engine.add_effect(&body.target, body.effect).await?;
    Ok(draft_link(&state, draft_id.as_str()))
}

pub async fn add_filter(
    State(state): State<AppState>,
    payload: Result<Json<AddFilterRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<DraftLink>>> {
    let Json(body) = payload?;
    if body.filter.effect_type.is_empty() {
        return Err(ApiError::missing_field("effect_type"));
    }
    let draft_id = state.engine.add_filter(&body.target, body.filter).await?;
    Ok(draft_link(&state, draft_id.as_str()))
}

async fn add_media(
    state: AppState,
    kind: MediaKind,
    payload: Result<Json<AddMediaBody>, JsonRejection>,
) -> ApiResult<Json<Envelope<DraftLink>>> {
    let Json(body) = payload?;
    if body.media_path.as_os_str().is_empty() {
        return Err(ApiError::missing_field("media_path"));
    }
    let (target, request) = body.into_request(kind);
    let draft_id = state.engine.add_media(&target, &request).await?;
    Ok(draft_link(&state, draft_id.as_str()))
}

pub async fn add_video(
    State(state): State<AppState>,
    payload: Result<Json<AddMediaBody>, JsonRejection>,
) -> ApiResult<Json<Envelope<DraftLink>>> {
    add_media(state, MediaKind::Video, payload).await
}

pub async fn add_audio(
    State(state): State<AppState>,
    payload: Result<Json<AddMediaBody>, JsonRejection>,
) -> ApiResult<Json<Envelope<DraftLink>>> {
    add_media(state, MediaKind::Audio, payload).await
}

pub async fn add_image(
    State(state): State<AppState>,
    payload: Result<Json<AddMediaBody>, JsonRejection>,
) -> ApiResult<Json<Envelope<DraftLink>>> {
    add_media(state, MediaKind::Image, payload).await
}

#[derive(Debug, Serialize)]
pub struct SavedDraft {
    pub draft_id: String,
    pub draft_path: String,
    pub draft_url: String,
}

/// Write a cached draft to disk.
pub async fn save_draft(
    State(state): State<AppState>,
    payload: Result<Json<SaveDraftRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<SavedDraft>>> {
    let Json(body) = payload?;
    if body.draft_id.is_empty() {
        return Err(ApiError::missing_field("draft_id"));
    }
    if body.draft_folder.as_os_str().is_empty() {
        return Err(ApiError::missing_field("draft_folder"));
    }

    let path = state.engine.save_draft(&body).await?;
    info!(draft_id = %body.draft_id, path = %path.display(), "Saved draft");

    Ok(ok(SavedDraft {
        draft_url: state.config.draft_url(&body.draft_id),
        draft_path: path.display().to_string(),
        draft_id: body.draft_id,
    }))
}

/// Scene effects that `add_effect` and templates accept.
pub async fn get_video_scene_effect_types() -> Json<Envelope<&'static [EffectMeta]>> {
    ok(EffectCatalog.scene_effects())
}

/// Filters that `add_filter` and templates accept.
pub async fn get_filter_types() -> Json<Envelope<&'static [EffectMeta]>> {
    ok(EffectCatalog.filters())
}
