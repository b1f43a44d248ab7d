//! Structured logging for draft assembly.
//!
//! Every line carries the draft id and the operation so the lifecycle of
//! one draft can be followed across concurrent requests.

use dft_models::DraftId;
use tracing::{error, info, warn, Span};

/// Logger bound to one draft and one operation.
#[derive(Debug, Clone)]
pub struct AssemblyLogger {
    draft_id: String,
    operation: String,
}

impl AssemblyLogger {
    pub fn new(draft_id: &DraftId, operation: &str) -> Self {
        Self::from_string(draft_id.as_str(), operation)
    }

    pub fn from_string(draft_id: &str, operation: &str) -> Self {
        Self {
            draft_id: draft_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            draft_id = %self.draft_id,
            operation = %self.operation,
            "Assembly started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            draft_id = %self.draft_id,
            operation = %self.operation,
            "Assembly progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            draft_id = %self.draft_id,
            operation = %self.operation,
            "Assembly warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            draft_id = %self.draft_id,
            operation = %self.operation,
            "Assembly error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            draft_id = %self.draft_id,
            operation = %self.operation,
            "Assembly completed: {}", message
        );
    }

    pub fn draft_id(&self) -> &str {
        &self.draft_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span for instrumenting the assembly future.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "assembly",
            draft_id = %self.draft_id,
            operation = %self.operation
        )
    }
}
