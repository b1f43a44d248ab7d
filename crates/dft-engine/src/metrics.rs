//! Counters for draft generation.

use metrics::counter;

/// Metric names as constants for consistency.
pub mod names {
    pub const DRAFTS_GENERATED_TOTAL: &str = "dft_drafts_generated_total";
    pub const OVERLAY_FAILURES_TOTAL: &str = "dft_overlay_failures_total";
    pub const PROBE_FAILURES_TOTAL: &str = "dft_probe_failures_total";
    pub const DRAFT_EDITS_TOTAL: &str = "dft_draft_edits_total";
    pub const DRAFTS_SAVED_TOTAL: &str = "dft_drafts_saved_total";
}

/// Record a fully materialized draft.
pub fn record_draft_generated() {
    counter!(names::DRAFTS_GENERATED_TOTAL).increment(1);
}

/// Record an overlay entry that could not be applied.
pub fn record_overlay_failure(kind: &'static str) {
    counter!(names::OVERLAY_FAILURES_TOTAL, "kind" => kind).increment(1);
}

/// Record a media file skipped because its duration could not be probed.
pub fn record_probe_failure(kind: &'static str) {
    counter!(names::PROBE_FAILURES_TOTAL, "kind" => kind).increment(1);
}

/// Record an edit applied to a cached draft.
pub fn record_draft_edit(operation: &'static str) {
    counter!(names::DRAFT_EDITS_TOTAL, "operation" => operation).increment(1);
}

pub fn record_draft_saved() {
    counter!(names::DRAFTS_SAVED_TOTAL).increment(1);
}
