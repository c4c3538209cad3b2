//! # Aggregation Module
//!
//! Merges scanner output and cache replay into one deduplicated, day-bucketed
//! timeline.
//!
//! ## Components
//! - [`CanonicalIndex`] - the per-session key map and day buckets
//! - [`AggregationEngine`] - drives load-and-index sessions against it

mod engine;
mod index;

pub use engine::{AggregationEngine, CACHE_PAGE_SIZE};
pub use index::{CanonicalIndex, Inserted};
