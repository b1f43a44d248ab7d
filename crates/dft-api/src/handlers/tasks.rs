//! Task status handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use dft_models::{Task, TaskStatus};
use serde::Deserialize;

use crate::envelope::{ok, Envelope};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryDraftStatusRequest {
    #[serde(default)]
    pub task_id: String,
}

/// Current status record of a task.
pub async fn query_draft_status(
    State(state): State<AppState>,
    payload: Result<Json<QueryDraftStatusRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<Task>>> {
    let Json(body) = payload?;
    if body.task_id.is_empty() {
        return Err(ApiError::missing_field("task_id"));
    }

    let task = state.tasks.query(&body.task_id);
    if task.status == TaskStatus::NotFound {
        return Err(ApiError::not_found(format!(
            "Task with ID {} not found",
            body.task_id
        )));
    }
    Ok(ok(task))
}
