//! Template CRUD handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use dft_models::{Template, TemplateTracks, TemplateUpdate};
use serde::{Deserialize, Serialize};

use crate::envelope::{ok, Envelope};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(default)]
    pub tracks: TemplateTracks,
}

#[derive(Debug, Serialize)]
pub struct DeletedTemplate {
    pub id: String,
    pub deleted: bool,
}

fn template_not_found(id: &str) -> ApiError {
    ApiError::not_found(format!("Template {id} not found"))
}

pub async fn list_templates(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<Template>>>> {
    Ok(ok(state.templates.list().await?))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Template>>> {
    let template = state
        .templates
        .get(&id)
        .await?
        .ok_or_else(|| template_not_found(&id))?;
    Ok(ok(template))
}

pub async fn create_template(
    State(state): State<AppState>,
    payload: Result<Json<CreateTemplateRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<Template>>> {
    let Json(body) = payload?;
    Ok(ok(state.templates.create(&body.name, body.tracks).await?))
}

pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TemplateUpdate>, JsonRejection>,
) -> ApiResult<Json<Envelope<Template>>> {
    let Json(update) = payload?;
    let template = state
        .templates
        .update(&id, update)
        .await?
        .ok_or_else(|| template_not_found(&id))?;
    Ok(ok(template))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<DeletedTemplate>>> {
    if !state.templates.delete(&id).await? {
        return Err(template_not_found(&id));
    }
    Ok(ok(DeletedTemplate { id, deleted: true }))
}
