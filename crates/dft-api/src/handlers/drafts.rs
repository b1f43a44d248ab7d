//! Draft handlers: creation, batch generation, script queries and links.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use dft_engine::GenerateDraftRequest;
use dft_models::TaskField;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::envelope::{ok, Envelope};
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Request to create an empty draft.
#[derive(Debug, Default, Deserialize)]
pub struct CreateDraftRequest {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Draft id together with its download link.
#[derive(Debug, Serialize)]
pub struct DraftLink {
    pub draft_id: String,
    pub draft_url: String,
}

/// Create an empty draft in the cache.
pub async fn create_draft(
    State(state): State<AppState>,
    payload: Result<Json<CreateDraftRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<DraftLink>>> {
    let Json(body) = payload?;
    let (default_width, default_height) = state.default_canvas();
    let width = body.width.unwrap_or(default_width);
    let height = body.height.unwrap_or(default_height);
    if width == 0 || height == 0 {
        return Err(ApiError::bad_request("canvas dimensions must be positive"));
    }

    let (draft_id, _) = state.drafts.create(width, height);
    info!(draft_id = %draft_id, width, height, "Created draft");

    Ok(ok(DraftLink {
        draft_url: state.config.draft_url(draft_id.as_str()),
        draft_id: draft_id.to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DraftIdRequest {
    #[serde(default)]
    pub draft_id: String,
}

/// Serialized timeline of a cached draft.
pub async fn query_script(
    State(state): State<AppState>,
    payload: Result<Json<DraftIdRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<String>>> {
    let Json(body) = payload?;
    if body.draft_id.is_empty() {
        return Err(ApiError::missing_field("draft_id"));
    }

    let timeline = state
        .drafts
        .get(&body.draft_id)
        .ok_or_else(|| ApiError::not_found(format!("Draft {} does not exist in cache", body.draft_id)))?;
    let script = timeline.lock().await.to_json()?;
    Ok(ok(script))
}

#[derive(Debug, Serialize)]
pub struct DraftUrl {
    pub draft_url: String,
}

/// Download link for a draft id.
pub async fn generate_draft_url(
    State(state): State<AppState>,
    payload: Result<Json<DraftIdRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<DraftUrl>>> {
    let Json(body) = payload?;
    if body.draft_id.is_empty() {
        return Err(ApiError::missing_field("draft_id"));
    }
    Ok(ok(DraftUrl {
        draft_url: state.config.draft_url(&body.draft_id),
    }))
}

/// Batch generation request: the engine request plus an optional task id
/// to report progress under.
#[derive(Debug, Deserialize)]
pub struct GenerateBatchDraftRequest {
    #[serde(flatten)]
    pub draft: GenerateDraftRequest,
    #[serde(default)]
    pub task_id: Option<String>,
}

/// Summary of a generated draft.
#[derive(Debug, Serialize)]
pub struct BatchDraftOutput {
    pub draft_id: String,
    pub draft_url: String,
    pub draft_path: String,
    /// Total timeline length in seconds
    pub duration: f64,
    pub video_count: usize,
    pub audio_count: usize,
    pub image_count: usize,
    pub skipped_files: Vec<String>,
    pub overlay_failures: usize,
}

/// Assemble a draft from local media folders and write it to disk.
pub async fn generate_batch_draft(
    State(state): State<AppState>,
    payload: Result<Json<GenerateBatchDraftRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<BatchDraftOutput>>> {
    let Json(body) = payload?;
    let task_id = body.task_id.filter(|id| !id.is_empty());

    if let Some(id) = &task_id {
        state.tasks.create(id);
        metrics::record_task_created();
        state.tasks.start(id, "Generating draft");
    }

    let generated = match state.engine.generate_draft(&body.draft).await {
        Ok(generated) => generated,
        Err(e) => {
            error!(error = %e, "Batch draft generation failed");
            if let Some(id) = &task_id {
                state.tasks.fail(id, e.to_string());
            }
            return Err(e.into());
        }
    };

    let output = BatchDraftOutput {
        draft_url: state.config.draft_url(generated.draft_id.as_str()),
        draft_id: generated.draft_id.to_string(),
        draft_path: generated.draft_path.display().to_string(),
        duration: generated.total_duration.as_secs_f64(),
        video_count: generated.video_count,
        audio_count: generated.audio_count,
        image_count: generated.image_count,
        skipped_files: generated
            .skipped_files
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        overlay_failures: generated.overlay.failed,
    };

    if let Some(id) = &task_id {
        let processed = (output.video_count + output.audio_count + output.image_count) as u32;
        let total = processed + output.skipped_files.len() as u32;
        state.tasks.update_fields(
            id,
            [
                TaskField::TotalFiles(total),
                TaskField::CompletedFiles(processed),
                TaskField::DraftUrl(output.draft_url.clone()),
            ],
        );
        state.tasks.complete(
            id,
            Some(json!({ "draft_id": output.draft_id, "draft_url": output.draft_url })),
        );
    }

    info!(draft_id = %output.draft_id, "Generated batch draft");
    Ok(ok(output))
}
