//! Media materials referenced by timeline segments.

use std::fmt;
use std::path::{Path, PathBuf};

use dft_models::{CropSettings, Micros};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    Video,
    Audio,
    /// Still image placed as a video segment
    Photo,
}

impl MaterialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialKind::Video => "video",
            MaterialKind::Audio => "audio",
            MaterialKind::Photo => "photo",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reference to a local media file with its probed duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub kind: MaterialKind,
    pub path: PathBuf,
    /// Display name (file name)
    pub name: String,
    pub duration: Micros,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropSettings>,
}

impl Material {
    fn new(kind: MaterialKind, path: impl Into<PathBuf>, duration: Micros) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self {
            id: Uuid::new_v4().simple().to_string(),
            kind,
            path,
            name,
            duration,
            crop: None,
        }
    }

    pub fn video(path: impl Into<PathBuf>, duration: Micros) -> Self {
        Self::new(MaterialKind::Video, path, duration)
    }

    pub fn audio(path: impl Into<PathBuf>, duration: Micros) -> Self {
        Self::new(MaterialKind::Audio, path, duration)
    }

    /// A still image shown for `duration`, optionally cropped.
    pub fn photo(path: impl Into<PathBuf>, duration: Micros, crop: Option<CropSettings>) -> Self {
        let mut material = Self::new(MaterialKind::Photo, path, duration);
        material.crop = crop.filter(|c| !c.is_full_frame());
        material
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_is_file_name() {
        let material = Material::video("/media/clips/intro.mp4", Micros::from_secs(3));
        assert_eq!(material.name, "intro.mp4");
        assert_eq!(material.kind, MaterialKind::Video);
        assert_eq!(material.duration, Micros(3_000_000));
    }

    #[test]
    fn test_photo_drops_full_frame_crop() {
        let full = Material::photo("/a.png", Micros(1), Some(CropSettings::default()));
        assert!(full.crop.is_none());

        let cropped = Material::photo(
            "/a.png",
            Micros(1),
            Some(CropSettings::from_rect(0.0, 0.0, 0.5, 0.5)),
        );
        assert!(cropped.crop.is_some());
    }
}
