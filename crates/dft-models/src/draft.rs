//! Draft identifiers and project metadata.

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Fixed prefix of every generated draft id.
pub const DRAFT_ID_PREFIX: &str = "dfd_cat";

/// Default canvas width (portrait 1080p).
pub const DEFAULT_CANVAS_WIDTH: u32 = 1080;

/// Default canvas height (portrait 1080p).
pub const DEFAULT_CANVAS_HEIGHT: u32 = 1920;

/// Unique identifier for an in-memory draft.
///
/// Generated ids look like `dfd_cat_1718000000_1a2b3c4d`: the fixed prefix,
/// the unix time in seconds and eight random hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DraftId(pub String);

impl DraftId {
    /// Generate a fresh draft id.
    pub fn generate() -> Self {
        let unix_secs = Utc::now().timestamp();
        let random = Uuid::new_v4().simple().to_string();
        Self(format!("{}_{}_{}", DRAFT_ID_PREFIX, unix_secs, &random[..8]))
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DraftId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fields rewritten in a draft's `draft_meta_info.json` on materialization.
///
/// Every other field of the skeleton's meta file is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftMetaPatch {
    pub draft_id: String,
    pub draft_name: String,
    /// Creation time, epoch microseconds
    pub tm_draft_create: i64,
    /// Modification time, epoch microseconds
    pub tm_draft_modified: i64,
}

impl DraftMetaPatch {
    /// Build a patch stamped with the current time.
    ///
    /// Both timestamps carry the same value: a re-materialized draft is
    /// recreated rather than updated.
    pub fn now(draft_id: &DraftId, draft_name: Option<&str>) -> Self {
        let now_us = Utc::now().timestamp_micros();
        Self {
            draft_id: draft_id.to_string(),
            draft_name: draft_name
                .filter(|n| !n.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| default_draft_name(draft_id)),
            tm_draft_create: now_us,
            tm_draft_modified: now_us,
        }
    }

    /// Write the patched fields into a meta JSON object.
    pub fn apply_to(&self, meta: &mut Map<String, Value>) {
        meta.insert("draft_id".into(), Value::from(self.draft_id.clone()));
        meta.insert("draft_name".into(), Value::from(self.draft_name.clone()));
        meta.insert("tm_draft_create".into(), Value::from(self.tm_draft_create));
        meta.insert("tm_draft_modified".into(), Value::from(self.tm_draft_modified));
    }
}

/// Name given to drafts materialized without an explicit name.
pub fn default_draft_name(draft_id: &DraftId) -> String {
    format!("AutoDraft_{}", draft_id)
}
