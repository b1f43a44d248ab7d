//! Draft session store.
//!
//! Holds in-flight timelines keyed by draft id. Each timeline sits behind
//! its own async mutex, so edits to one draft are serialized while other
//! drafts proceed in parallel.

use std::sync::Arc;

use dft_models::DraftId;
use dft_timeline::Timeline;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::BoundedCache;
use crate::metrics;

/// A timeline shared between the store and its current editors.
pub type SharedTimeline = Arc<Mutex<Timeline>>;

/// Bounded store of draft timelines.
#[derive(Debug)]
pub struct DraftStore {
    cache: BoundedCache<SharedTimeline>,
}

impl DraftStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: BoundedCache::new("drafts", capacity),
        }
    }

    /// Mint a new draft with an empty timeline.
    pub fn create(&self, width: u32, height: u32) -> (DraftId, SharedTimeline) {
        let draft_id = DraftId::generate();
        let timeline = Arc::new(Mutex::new(Timeline::new(width, height)));
        self.cache.put(draft_id.as_str(), Arc::clone(&timeline));
        metrics::record_draft_created();
        info!(draft_id = %draft_id, width, height, "Created draft");
        (draft_id, timeline)
    }

    /// Return the cached draft for `draft_id`, or create a new one.
    ///
    /// An unknown or absent id always yields a freshly minted id; the
    /// caller's id is never reused for a new draft.
    pub fn get_or_create(
        &self,
        draft_id: Option<&str>,
        width: u32,
        height: u32,
    ) -> (DraftId, SharedTimeline) {
        if let Some(id) = draft_id {
            if let Some(timeline) = self.cache.get(id) {
                debug!(draft_id = %id, "Reusing cached draft");
                return (DraftId::from_string(id), timeline);
            }
            debug!(draft_id = %id, "Draft not in cache, creating a new one");
        }
        self.create(width, height)
    }

    /// Look up a draft, marking it recently used.
    pub fn get(&self, draft_id: &str) -> Option<SharedTimeline> {
        self.cache.get(draft_id)
    }

    pub fn remove(&self, draft_id: &str) -> bool {
        self.cache.delete(draft_id).is_some()
    }

    pub fn contains(&self, draft_id: &str) -> bool {
        self.cache.contains(draft_id)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }
}
