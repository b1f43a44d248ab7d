//! Engine error types.

use std::path::PathBuf;

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Draft not found: {0}")]
    DraftNotFound(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(#[from] dft_models::TemplateError),

    #[error("Invalid draft meta file {path}: {reason}")]
    InvalidMeta { path: PathBuf, reason: String },

    #[error("Timeline error: {0}")]
    Timeline(#[from] dft_timeline::TimelineError),

    /// A timeline edit rejected because of the caller's input.
    #[error("Invalid edit: {0}")]
    InvalidEdit(#[source] dft_timeline::TimelineError),

    #[error("Media error: {0}")]
    Media(#[from] dft_media::MediaError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn draft_not_found(id: impl Into<String>) -> Self {
        Self::DraftNotFound(id.into())
    }

    pub fn invalid_meta(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidMeta {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::InvalidTemplate(_) | Self::InvalidEdit(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_errors_are_client_errors() {
        let edit = EngineError::InvalidEdit(dft_timeline::TimelineError::UnknownFilter("x".into()));
        assert!(edit.is_client_error());
        assert!(!EngineError::draft_not_found("d").is_client_error());
        assert!(!EngineError::from(dft_timeline::TimelineError::UnknownFilter("x".into())).is_client_error());
    }
}
