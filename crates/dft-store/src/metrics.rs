//! Counters for the in-memory stores.

use metrics::counter;

/// Metric names as constants for consistency.
pub mod names {
    pub const CACHE_EVICTIONS_TOTAL: &str = "dft_cache_evictions_total";
    pub const DRAFTS_CREATED_TOTAL: &str = "dft_drafts_created_total";
}

/// Record an LRU eviction from the named cache.
pub fn record_eviction(cache: &'static str) {
    counter!(names::CACHE_EVICTIONS_TOTAL, "cache" => cache).increment(1);
}

/// Record a newly minted draft.
pub fn record_draft_created() {
    counter!(names::DRAFTS_CREATED_TOTAL).increment(1);
}
