//! Filesystem utilities for writing draft folders.

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Recursively copy the directory tree at `src` into `dst`.
///
/// `dst` and any missing parents are created. Existing files in `dst` with
/// the same names are overwritten.
///
/// # Errors
///
/// Returns an error if:
/// - `src` doesn't exist or isn't a directory
/// - Any directory creation or file copy fails
pub async fn copy_dir_all(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<u64> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    match fs::metadata(src).await {
        Ok(m) if m.is_dir() => {}
        Ok(_) => return Err(MediaError::NotADirectory(src.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(MediaError::FileNotFound(src.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    }

    let mut copied = 0u64;
    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(src.to_path_buf(), dst.to_path_buf())];

    while let Some((from, to)) = pending.pop() {
        fs::create_dir_all(&to).await?;
        let mut entries = fs::read_dir(&from).await?;
        while let Some(entry) = entries.next_entry().await? {
            let target = to.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                pending.push((entry.path(), target));
            } else {
                fs::copy(entry.path(), &target).await?;
                copied += 1;
            }
        }
    }

    tracing::debug!(
        "Copied {} files: {} -> {}",
        copied,
        src.display(),
        dst.display()
    );
    Ok(copied)
}

/// Remove a directory tree if it exists. Returns whether anything was removed.
pub async fn remove_dir_if_exists(path: impl AsRef<Path>) -> MediaResult<bool> {
    match fs::remove_dir_all(path.as_ref()).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(MediaError::from(e)),
    }
}

/// Write `contents` to `path` via a temp file in the same directory, then
/// rename over the destination.
pub async fn write_atomic(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> MediaResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).await?;

    fs::rename(&tmp, path).await.map_err(|e| {
        // Clean up temp file on failure
        let _ = std::fs::remove_file(&tmp);
        tracing::error!(
            "Failed to rename temp file: {} -> {}: {}",
            tmp.display(),
            path.display(),
            e
        );
        MediaError::from(e)
    })
}
