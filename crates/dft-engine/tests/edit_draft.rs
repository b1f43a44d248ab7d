//! Editing cached drafts segment by segment and saving them on demand.

use std::path::PathBuf;
use std::sync::Arc;

use dft_engine::{
    AddMediaRequest, DraftEngine, DraftTarget, EngineConfig, EngineError, SaveDraftRequest,
    TemplateRepository, DRAFT_CONTENT_FILE, DRAFT_META_FILE,
};
use dft_media::FixedDurationProbe;
use dft_models::{EffectEntry, FilterEntry, MediaKind, Micros, Placement, TextEntry};
use dft_store::DraftStore;
use dft_timeline::{MaterialKind, Segment, TrackKind};
use tempfile::TempDir;

struct Fixture {
    root: TempDir,
    engine: DraftEngine,
    drafts: Arc<DraftStore>,
}

impl Fixture {
    fn new(probe: FixedDurationProbe) -> Self {
        let root = TempDir::new().unwrap();
        let skeleton = root.path().join("skeleton");
        std::fs::create_dir_all(&skeleton).unwrap();
        std::fs::write(skeleton.join(DRAFT_CONTENT_FILE), b"{}").unwrap();
        std::fs::write(skeleton.join(DRAFT_META_FILE), br#"{"draft_id": "skeleton"}"#).unwrap();
        std::fs::create_dir_all(root.path().join("media")).unwrap();

        let config = EngineConfig {
            skeleton_dir: skeleton,
            template_dir: root.path().join("templates"),
            ..EngineConfig::default()
        };
        let drafts = Arc::new(DraftStore::new(8));
        let templates = Arc::new(TemplateRepository::new(&config.template_dir));
        let engine = DraftEngine::new(config, Arc::clone(&drafts), templates, Arc::new(probe));

        Self {
            root,
            engine,
            drafts,
        }
    }

    fn media(&self, name: &str) -> PathBuf {
        let path = self.root.path().join("media").join(name);
        std::fs::write(&path, b"").unwrap();
        path
    }
}

fn secs(s: u64) -> Micros {
    Micros::from_secs(s)
}

#[tokio::test]
async fn test_unknown_id_mints_then_reuses() {
    let fx = Fixture::new(FixedDurationProbe::new());

    let first = fx
        .engine
        .add_text(
            &DraftTarget::draft("no-such-draft"),
            TextEntry::new("hello", Placement::fixed(0.0, 2.0)),
        )
        .await
        .unwrap();
    assert_ne!(first.as_str(), "no-such-draft");
    assert_eq!(fx.drafts.len(), 1);

    let second = fx
        .engine
        .add_text(
            &DraftTarget::draft(first.as_str()),
            TextEntry::new("world", Placement::fixed(2.0, 4.0)),
        )
        .await
        .unwrap();
    assert_eq!(second, first);
    assert_eq!(fx.drafts.len(), 1);

    let timeline = fx.drafts.get(first.as_str()).unwrap();
    let timeline = timeline.lock().await;
    let track = timeline.track(TrackKind::Text, None).unwrap();
    assert_eq!(track.segments.len(), 2);
    assert_eq!(track.end(), secs(4));
}

#[tokio::test]
async fn test_full_duration_effect_spans_added_media() {
    let fx = Fixture::new(FixedDurationProbe::new().with("clip.mp4", secs(6)));
    let clip = fx.media("clip.mp4");

    let draft_id = fx
        .engine
        .add_media(&DraftTarget::default(), &AddMediaRequest::new(&clip, MediaKind::Video))
        .await
        .unwrap();
    let target = DraftTarget::draft(draft_id.as_str());

    fx.engine
        .add_effect(&target, EffectEntry::new("星火", Placement::full_duration()))
        .await
        .unwrap();
    let mut filter = FilterEntry::new("高清", Placement::fixed(1.0, 2.0));
    filter.intensity = Some(40.0);
    fx.engine.add_filter(&target, filter).await.unwrap();

    let timeline = fx.drafts.get(draft_id.as_str()).unwrap();
    let timeline = timeline.lock().await;
    assert_eq!(timeline.track(TrackKind::Effect, None).unwrap().end(), secs(6));
    match &timeline.track(TrackKind::Filter, None).unwrap().segments[0] {
        Segment::Filter(filter) => assert!((filter.intensity - 40.0).abs() < 1e-9),
        other => panic!("unexpected segment {other:?}"),
    }
}

#[tokio::test]
async fn test_media_trim_and_placement() {
    let probe = FixedDurationProbe::new()
        .with("intro.mp4", secs(5))
        .with("theme.mp3", secs(8));
    let fx = Fixture::new(probe);
    let intro = fx.media("intro.mp4");
    let theme = fx.media("theme.mp3");
    let still = fx.media("cover.png");

    let mut trimmed = AddMediaRequest::new(&intro, MediaKind::Video);
    trimmed.start = 1.0;
    trimmed.end = Some(30.0);
    let draft_id = fx
        .engine
        .add_media(&DraftTarget::default(), &trimmed)
        .await
        .unwrap();
    let target = DraftTarget::draft(draft_id.as_str());

    fx.engine
        .add_media(&target, &AddMediaRequest::new(&still, MediaKind::Image))
        .await
        .unwrap();

    let mut music = AddMediaRequest::new(&theme, MediaKind::Audio);
    music.target_start = Some(2.0);
    fx.engine.add_media(&target, &music).await.unwrap();

    let timeline = fx.drafts.get(draft_id.as_str()).unwrap();
    let timeline = timeline.lock().await;
    let video: Vec<_> = timeline
        .track(TrackKind::Video, None)
        .unwrap()
        .media_segments()
        .map(|s| (s.source_range.start, s.target_range.start, s.target_range.duration))
        .collect();
    assert_eq!(
        video,
        vec![
            (secs(1), secs(0), secs(4)),
            (Micros::ZERO, secs(4), secs(3)),
        ]
    );

    let audio = timeline.track(TrackKind::Audio, None).unwrap();
    assert_eq!(audio.end(), secs(10));
    assert_eq!(
        timeline
            .materials
            .iter()
            .filter(|m| m.kind == MaterialKind::Photo)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_rejected_edit_discards_minted_draft() {
    let fx = Fixture::new(FixedDurationProbe::new());

    // Nothing to span yet, so a full-duration entry has an empty range
    let err = fx
        .engine
        .add_text(&DraftTarget::default(), TextEntry::new("title", Placement::full_duration()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidEdit(_)));
    assert!(err.is_client_error());
    assert!(fx.drafts.is_empty());
}

#[tokio::test]
async fn test_rejected_edit_keeps_existing_draft() {
    let fx = Fixture::new(FixedDurationProbe::new());
    let draft_id = fx
        .engine
        .add_text(&DraftTarget::default(), TextEntry::new("a", Placement::fixed(0.0, 3.0)))
        .await
        .unwrap();
    let target = DraftTarget::draft(draft_id.as_str());

    let err = fx
        .engine
        .add_effect(&target, EffectEntry::new("不存在的特效", Placement::fixed(0.0, 1.0)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidEdit(_)));

    let overlapping = fx
        .engine
        .add_text(&target, TextEntry::new("b", Placement::fixed(1.0, 2.0)))
        .await;
    assert!(overlapping.is_err());

    assert!(fx.drafts.contains(draft_id.as_str()));
    let timeline = fx.drafts.get(draft_id.as_str()).unwrap();
    let timeline = timeline.lock().await;
    assert!(timeline.tracks_of(TrackKind::Effect).next().is_none());
    assert_eq!(timeline.track(TrackKind::Text, None).unwrap().segments.len(), 1);
}

#[tokio::test]
async fn test_missing_or_unreadable_media_rejected() {
    let fx = Fixture::new(FixedDurationProbe::new());

    let missing = AddMediaRequest::new(fx.root.path().join("media/ghost.mp4"), MediaKind::Video);
    let err = fx
        .engine
        .add_media(&DraftTarget::default(), &missing)
        .await
        .unwrap_err();
    assert!(err.is_client_error());

    let unreadable = AddMediaRequest::new(fx.media("broken.mp4"), MediaKind::Video);
    let err = fx
        .engine
        .add_media(&DraftTarget::default(), &unreadable)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)));
    assert!(fx.drafts.is_empty());
}

#[tokio::test]
async fn test_save_draft_writes_cached_timeline() {
    let fx = Fixture::new(FixedDurationProbe::new());
    let draft_id = fx
        .engine
        .add_text(&DraftTarget::default(), TextEntry::new("saved", Placement::fixed(0.0, 2.0)))
        .await
        .unwrap();

    let request = SaveDraftRequest {
        draft_id: draft_id.to_string(),
        draft_folder: fx.root.path().join("out"),
        draft_name: Some("Edited".into()),
    };
    let path = fx.engine.save_draft(&request).await.unwrap();
    assert_eq!(path, fx.root.path().join("out").join(draft_id.as_str()));
    assert!(fx.drafts.contains(draft_id.as_str()));

    let content: serde_json::Value =
        serde_json::from_slice(&std::fs::read(path.join(DRAFT_CONTENT_FILE)).unwrap()).unwrap();
    assert_eq!(content["tracks"][0]["kind"], "text");

    let meta: serde_json::Value =
        serde_json::from_slice(&std::fs::read(path.join(DRAFT_META_FILE)).unwrap()).unwrap();
    assert_eq!(meta["draft_id"], draft_id.as_str());
    assert_eq!(meta["draft_name"], "Edited");
}

#[tokio::test]
async fn test_save_unknown_draft() {
    let fx = Fixture::new(FixedDurationProbe::new());
    let request = SaveDraftRequest {
        draft_id: "dfd_cat_missing".into(),
        draft_folder: fx.root.path().join("out"),
        draft_name: None,
    };
    let err = fx.engine.save_draft(&request).await.unwrap_err();
    assert!(matches!(err, EngineError::DraftNotFound(id) if id == "dfd_cat_missing"));
    assert!(!fx.root.path().join("out").exists());
}
