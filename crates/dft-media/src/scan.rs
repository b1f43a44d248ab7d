//! Media discovery in local directories.

use std::path::{Path, PathBuf};

use dft_models::MediaKind;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// A discovered media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Absolute path
    pub path: PathBuf,
    pub kind: MediaKind,
}

impl MediaFile {
    /// File name for logs and display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// List the files of `kind` directly inside `dir`.
///
/// Extensions are matched case-insensitively against the kind's allow-list,
/// subdirectories are not entered, and the result is sorted by absolute
/// path. A missing directory yields an empty list.
pub async fn list_media_files(dir: impl AsRef<Path>, kind: MediaKind) -> MediaResult<Vec<MediaFile>> {
    let dir = dir.as_ref();

    let metadata = match fs::metadata(dir).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(dir = %dir.display(), kind = %kind, "Media directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_dir() {
        return Err(MediaError::NotADirectory(dir.to_path_buf()));
    }

    let dir = fs::canonicalize(dir).await?;
    let mut entries = fs::read_dir(&dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let accepted = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| kind.accepts_extension(ext));
        if !accepted {
            continue;
        }
        // Follows symlinks
        match fs::metadata(&path).await {
            Ok(m) if m.is_file() => files.push(MediaFile { path, kind }),
            Ok(_) => {}
            Err(e) => debug!(path = %path.display(), error = %e, "Skipping unreadable entry"),
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(dir = %dir.display(), kind = %kind, count = files.len(), "Listed media files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").await.unwrap();
    }

    #[tokio::test]
    async fn test_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["b.mp4", "a.MOV", "c.mp3", "notes.txt", "d.mkv"] {
            touch(dir.path(), name).await;
        }
        fs::create_dir(dir.path().join("nested.mp4")).await.unwrap();

        let files = list_media_files(dir.path(), MediaKind::Video).await.unwrap();
        let names: Vec<String> = files.iter().map(MediaFile::file_name).collect();
        assert_eq!(names, vec!["a.MOV", "b.mp4", "d.mkv"]);
        assert!(files.iter().all(|f| f.path.is_absolute()));
        assert!(files.iter().all(|f| f.kind == MediaKind::Video));
    }

    #[tokio::test]
    async fn test_non_recursive() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).await.unwrap();
        touch(&sub, "deep.png").await;
        touch(dir.path(), "top.png").await;

        let files = list_media_files(dir.path(), MediaKind::Image).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), "top.png");
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let files = list_media_files(dir.path().join("absent"), MediaKind::Audio)
            .await
            .unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_file_instead_of_directory() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.mp3").await;
        let err = list_media_files(dir.path().join("a.mp3"), MediaKind::Audio)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::NotADirectory(_)));
    }
}
