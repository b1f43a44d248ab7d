//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use dft_api::{create_router, ApiConfig, AppState};
use dft_engine::{EngineConfig, DRAFT_CONTENT_FILE, DRAFT_META_FILE};
use dft_media::FixedDurationProbe;
use dft_models::Micros;
use dft_store::StoreConfig;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    root: TempDir,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let skeleton = root.path().join("skeleton");
        std::fs::create_dir_all(&skeleton).unwrap();
        std::fs::write(skeleton.join(DRAFT_CONTENT_FILE), b"{}").unwrap();
        std::fs::write(skeleton.join(DRAFT_META_FILE), b"{}").unwrap();
        for dir in ["videos", "audios"] {
            std::fs::create_dir_all(root.path().join(dir)).unwrap();
        }
        std::fs::write(root.path().join("videos").join("intro.mp4"), b"").unwrap();
        std::fs::write(root.path().join("audios").join("theme.mp3"), b"").unwrap();

        let probe = FixedDurationProbe::new()
            .with("intro.mp4", Micros::from_secs(4))
            .with("theme.mp3", Micros::from_secs(4));
        let engine_config = EngineConfig {
            skeleton_dir: skeleton,
            template_dir: root.path().join("templates"),
            ..EngineConfig::default()
        };
        let config = ApiConfig {
            draft_domain: "http://drafts.test".into(),
            ..ApiConfig::default()
        };
        let state = AppState::new(config, StoreConfig::default(), engine_config, Arc::new(probe));

        Self {
            root,
            router: create_router(state, None),
        }
    }

    fn path(&self, name: &str) -> String {
        self.root.path().join(name).display().to_string()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.json("POST", uri, body).await
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cached_drafts"], 0);
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let app = TestApp::new();
    let (status, _) = app.get("/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_draft_and_query_script() {
    let app = TestApp::new();
    let (status, created) = app
        .post("/create_draft", json!({"width": 1920, "height": 1080}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["success"], true);
    assert_eq!(created["error"], "");

    let draft_id = created["output"]["draft_id"].as_str().unwrap().to_string();
    assert!(draft_id.starts_with("dfd_cat_"));
    assert_eq!(
        created["output"]["draft_url"],
        format!("http://drafts.test/draft/downloader?draft_id={draft_id}")
    );

    let (status, script) = app
        .post("/query_script", json!({"draft_id": draft_id}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let timeline: Value = serde_json::from_str(script["output"].as_str().unwrap()).unwrap();
    assert_eq!(timeline["canvas"]["width"], 1920);
    assert_eq!(timeline["canvas"]["height"], 1080);
}

#[tokio::test]
async fn test_create_draft_uses_default_canvas() {
    let app = TestApp::new();
    let (_, created) = app.post("/create_draft", json!({})).await;
    let draft_id = created["output"]["draft_id"].as_str().unwrap().to_string();

    let (_, script) = app
        .post("/query_script", json!({"draft_id": draft_id}))
        .await;
    let timeline: Value = serde_json::from_str(script["output"].as_str().unwrap()).unwrap();
    assert_eq!(timeline["canvas"]["width"], 1080);
    assert_eq!(timeline["canvas"]["height"], 1920);
}

#[tokio::test]
async fn test_query_script_errors_use_envelope() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/query_script", json!({"draft_id": "dfd_cat_0_missing"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["output"], "");
    assert!(body["error"].as_str().unwrap().contains("dfd_cat_0_missing"));

    let (status, body) = app.post("/query_script", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("draft_id"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/create_draft")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_generate_draft_url() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/generate_draft_url", json!({"draft_id": "abc"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["output"]["draft_url"],
        "http://drafts.test/draft/downloader?draft_id=abc"
    );
}

#[tokio::test]
async fn test_batch_draft_reports_task_progress() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/generate_batch_draft",
            json!({
                "video_dir": app.path("videos"),
                "audio_dir": app.path("audios"),
                "draft_folder": app.path("out"),
                "draft_name": "Batch",
                "task_id": "job-1",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let output = &body["output"];
    let draft_id = output["draft_id"].as_str().unwrap().to_string();
    assert_eq!(output["duration"], 4.0);
    assert_eq!(output["video_count"], 1);
    assert_eq!(output["audio_count"], 1);
    assert!(app.root.path().join("out").join(&draft_id).join(DRAFT_META_FILE).exists());

    let (status, task) = app
        .post("/query_draft_status", json!({"task_id": "job-1"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["output"]["status"], "completed");
    assert_eq!(task["output"]["progress"], 100);
    assert_eq!(task["output"]["completed_files"], 2);
    assert_eq!(task["output"]["data"]["draft_id"], draft_id);

    let (_, script) = app
        .post("/query_script", json!({"draft_id": draft_id}))
        .await;
    assert_eq!(script["success"], true);
}

#[tokio::test]
async fn test_batch_failure_marks_task_failed() {
    let app = TestApp::new();
    std::fs::remove_dir_all(app.root.path().join("skeleton")).unwrap();

    let (status, body) = app
        .post(
            "/generate_batch_draft",
            json!({
                "video_dir": app.path("videos"),
                "audio_dir": app.path("audios"),
                "draft_folder": app.path("out"),
                "task_id": "job-2",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);

    let (_, task) = app
        .post("/query_draft_status", json!({"task_id": "job-2"}))
        .await;
    assert_eq!(task["output"]["status"], "failed");
}

#[tokio::test]
async fn test_batch_missing_fields_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/generate_batch_draft", json!({"video_dir": app.path("videos")}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/query_draft_status", json!({"task_id": "nope"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_template_crud() {
    let app = TestApp::new();

    let (status, created) = app
        .post(
            "/templates",
            json!({
                "name": "Promo",
                "tracks": {
                    "texts": [{"text": "Hello", "start": 0.0, "end": 2.0}],
                    "effects": [{"effect_type": "金粉", "is_full_duration": true}]
                }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{created}");
    let id = created["output"]["id"].as_str().unwrap().to_string();

    let (_, listed) = app.get("/templates").await;
    assert_eq!(listed["output"].as_array().unwrap().len(), 1);

    let (status, updated) = app
        .json("PUT", &format!("/templates/{id}"), json!({"name": "Renamed"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["output"]["name"], "Renamed");
    assert_eq!(updated["output"]["id"], id.as_str());

    let (_, fetched) = app.get(&format!("/templates/{id}")).await;
    assert_eq!(fetched["output"]["name"], "Renamed");

    let (status, _) = app.json("DELETE", &format!("/templates/{id}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get(&format!("/templates/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_invalid_template_rejected() {
    let app = TestApp::new();
    let (status, body) = app.post("/templates", json!({"name": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_edit_and_save_draft_by_id() {
    let app = TestApp::new();
    let (_, created) = app.post("/create_draft", json!({})).await;
    let draft_id = created["output"]["draft_id"].as_str().unwrap().to_string();

    let edits = [
        ("/add_video", json!({"draft_id": draft_id, "media_path": app.path("videos/intro.mp4")})),
        ("/add_audio", json!({"draft_id": draft_id, "media_path": app.path("audios/theme.mp3")})),
        ("/add_text", json!({"draft_id": draft_id, "text": "Hi", "is_full_duration": true})),
        ("/add_effect", json!({"draft_id": draft_id, "effect_type": "星火", "start": 0.0, "end": 2.0})),
        ("/add_filter", json!({"draft_id": draft_id, "effect_type": "高清", "is_full_duration": true})),
    ];
    for (uri, body) in edits {
        let (status, response) = app.post(uri, body).await;
        assert_eq!(status, StatusCode::OK, "{uri}: {response}");
        assert_eq!(response["output"]["draft_id"], draft_id.as_str());
    }

    let (_, script) = app
        .post("/query_script", json!({"draft_id": draft_id}))
        .await;
    let timeline: Value = serde_json::from_str(script["output"].as_str().unwrap()).unwrap();
    assert_eq!(timeline["tracks"].as_array().unwrap().len(), 5);
    assert_eq!(timeline["materials"].as_array().unwrap().len(), 2);

    let (status, saved) = app
        .post(
            "/save_draft",
            json!({"draft_id": draft_id, "draft_folder": app.path("saved")}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{saved}");
    let content = app.root.path().join("saved").join(&draft_id).join(DRAFT_CONTENT_FILE);
    let written: Value = serde_json::from_slice(&std::fs::read(content).unwrap()).unwrap();
    assert_eq!(written["tracks"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_edit_on_unknown_draft_mints_new_id() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/add_text",
            json!({"draft_id": "dfd_cat_0_gone", "text": "Hi", "start": 0.0, "end": 1.0}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let draft_id = body["output"]["draft_id"].as_str().unwrap();
    assert_ne!(draft_id, "dfd_cat_0_gone");

    let (_, health) = app.get("/health").await;
    assert_eq!(health["cached_drafts"], 1);
}

#[tokio::test]
async fn test_edit_errors() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/add_effect", json!({"effect_type": "不存在的特效", "start": 0.0, "end": 1.0}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("不存在的特效"));

    let (status, _) = app.post("/add_text", json!({"start": 0.0, "end": 1.0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post("/add_image", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("media_path"));

    let (_, health) = app.get("/health").await;
    assert_eq!(health["cached_drafts"], 0);
}

#[tokio::test]
async fn test_save_draft_errors() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/save_draft",
            json!({"draft_id": "dfd_cat_0_missing", "draft_folder": app.path("saved")}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("dfd_cat_0_missing"));

    let (status, body) = app.post("/save_draft", json!({"draft_id": "x"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("draft_folder"));
}

#[tokio::test]
async fn test_catalog_listings() {
    let app = TestApp::new();

    let (status, effects) = app.get("/get_video_scene_effect_types").await;
    assert_eq!(status, StatusCode::OK);
    let effects = effects["output"].as_array().unwrap();
    assert_eq!(effects.len(), 10);
    assert!(effects.iter().any(|e| e["name"] == "星火"));
    assert_eq!(effects[0]["params"], json!(["speed", "opacity"]));

    let (_, filters) = app.get("/get_filter_types").await;
    let filters = filters["output"].as_array().unwrap();
    assert_eq!(filters.len(), 8);
    assert!(filters.iter().any(|f| f["name"] == "高清"));
}
