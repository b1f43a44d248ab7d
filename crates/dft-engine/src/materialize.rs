//! Writing a draft to its on-disk folder.
//!
//! Layout: `{draft_folder}/{draft_id}/` is a fresh copy of the project
//! skeleton with `draft_content.json` replaced by the serialized timeline
//! and four fields of `draft_meta_info.json` rewritten.

use std::path::{Path, PathBuf};

use dft_media::fs_utils::{copy_dir_all, remove_dir_if_exists, write_atomic};
use dft_models::{DraftId, DraftMetaPatch};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};

pub const DRAFT_CONTENT_FILE: &str = "draft_content.json";
pub const DRAFT_META_FILE: &str = "draft_meta_info.json";

/// Materialize a draft folder. On failure the partially written folder is
/// removed before the error is returned.
pub async fn materialize_draft(
    skeleton_dir: &Path,
    draft_folder: &Path,
    draft_id: &DraftId,
    content_json: &str,
    draft_name: Option<&str>,
) -> EngineResult<PathBuf> {
    let target = draft_folder.join(draft_id.as_str());

    match write_draft(skeleton_dir, &target, draft_id, content_json, draft_name).await {
        Ok(()) => Ok(target),
        Err(e) => {
            if let Err(cleanup) = remove_dir_if_exists(&target).await {
                warn!(
                    path = %target.display(),
                    error = %cleanup,
                    "Failed to remove partial draft folder"
                );
            }
            Err(e)
        }
    }
}

async fn write_draft(
    skeleton_dir: &Path,
    target: &Path,
    draft_id: &DraftId,
    content_json: &str,
    draft_name: Option<&str>,
) -> EngineResult<()> {
    // Replace, never merge
    if remove_dir_if_exists(target).await? {
        debug!(path = %target.display(), "Removed existing draft folder");
    }
    copy_dir_all(skeleton_dir, target).await?;

    write_atomic(target.join(DRAFT_CONTENT_FILE), content_json).await?;

    let meta_path = target.join(DRAFT_META_FILE);
    let mut meta = read_meta(&meta_path).await?;
    DraftMetaPatch::now(draft_id, draft_name).apply_to(&mut meta);
    let json = serde_json::to_vec_pretty(&Value::Object(meta))?;
    write_atomic(&meta_path, json).await?;

    Ok(())
}

/// Read the meta object, or start from an empty one if the skeleton has
/// no meta file.
async fn read_meta(path: &Path) -> EngineResult<Map<String, Value>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Skeleton has no meta file, creating one");
            return Ok(Map::new());
        }
        Err(e) => return Err(e.into()),
    };
    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Object(map) => Ok(map),
        _ => Err(EngineError::invalid_meta(path, "expected a JSON object")),
    }
}
