//! Media duration probing.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use dft_models::Micros;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Reports the playable duration of a media file.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    async fn duration(&self, path: &Path) -> MediaResult<Micros>;
}

/// Media file information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration: f64,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    duration: Option<String>,
}

/// Probe a media file with ffprobe.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    // Check FFprobe exists
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ffprobe_failed(
            "FFprobe failed",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
        ));
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
    media_info_from(path, &probe)
}

fn media_info_from(path: &Path, probe: &FfprobeOutput) -> MediaResult<MediaInfo> {
    // Container duration first, then the longest stream
    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(parse_seconds)
        .or_else(|| {
            probe
                .streams
                .iter()
                .filter_map(|s| s.duration.as_deref().and_then(parse_seconds))
                .reduce(f64::max)
        })
        .ok_or_else(|| MediaError::NoDuration(path.to_path_buf()))?;

    Ok(MediaInfo { duration })
}

fn parse_seconds(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|d| d.is_finite() && *d > 0.0)
}

/// Duration probe backed by the ffprobe binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfprobeDurationProbe;

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn duration(&self, path: &Path) -> MediaResult<Micros> {
        let info = probe_media(path).await?;
        Ok(Micros::from_secs_f64(info.duration))
    }
}

/// Probe answering from a fixed table keyed by file name.
///
/// Files missing from the table fail to probe. Useful for exercising the
/// assembly engine without real media.
#[derive(Debug, Clone, Default)]
pub struct FixedDurationProbe {
    durations: HashMap<String, Micros>,
}

impl FixedDurationProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, file_name: impl Into<String>, duration: Micros) -> Self {
        self.durations.insert(file_name.into(), duration);
        self
    }
}

#[async_trait]
impl DurationProbe for FixedDurationProbe {
    async fn duration(&self, path: &Path) -> MediaResult<Micros> {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| self.durations.get(n).copied())
            .ok_or_else(|| MediaError::NoDuration(path.to_path_buf()))
    }
}
