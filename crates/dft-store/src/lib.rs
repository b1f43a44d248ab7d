//! In-memory stores shared across requests.
//!
//! - [`BoundedCache`]: generic LRU cache with a fixed capacity
//! - [`DraftStore`]: draft timelines keyed by draft id
//! - [`TaskTracker`]: status records for asynchronous jobs
//!
//! Stores are plain values; wrap them in `Arc` to share them.

pub mod cache;
pub mod config;
pub mod drafts;
pub mod metrics;
pub mod tasks;

pub use cache::BoundedCache;
pub use config::StoreConfig;
pub use drafts::{DraftStore, SharedTimeline};
pub use tasks::TaskTracker;
