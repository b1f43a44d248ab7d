//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    add_audio, add_effect, add_filter, add_image, add_text, add_video, create_draft,
    create_template, delete_template, generate_batch_draft, generate_draft_url,
    get_filter_types, get_template, get_video_scene_effect_types, health, list_templates,
    query_draft_status, query_script, save_draft, update_template,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let draft_routes = Router::new()
        .route("/create_draft", post(create_draft))
        .route("/query_script", post(query_script))
        .route("/generate_batch_draft", post(generate_batch_draft))
        .route("/generate_draft_url", post(generate_draft_url))
        .route("/query_draft_status", post(query_draft_status))
        .route("/save_draft", post(save_draft));

    let edit_routes = Router::new()
        .route("/add_video", post(add_video))
        .route("/add_audio", post(add_audio))
        .route("/add_image", post(add_image))
        .route("/add_text", post(add_text))
        .route("/add_effect", post(add_effect))
        .route("/add_filter", post(add_filter))
        .route("/get_video_scene_effect_types", get(get_video_scene_effect_types))
        .route("/get_filter_types", get(get_filter_types));

    let template_routes = Router::new()
        .route("/templates", get(list_templates).post(create_template))
        .route(
            "/templates/:id",
            get(get_template).put(update_template).delete(delete_template),
        );

    let mut router = Router::new()
        .route("/health", get(health))
        .merge(draft_routes)
        .merge(edit_routes)
        .merge(template_routes);

    if let Some(handle) = metrics_handle {
        router = router
            .route("/metrics", get(move || async move { handle.render() }))
            .route_layer(middleware::from_fn(metrics_middleware));
    }

    let max_body_size = state.config.max_body_size;
    let cors = cors_layer(&state.config.cors_origins);

    router
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
