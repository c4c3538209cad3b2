//! # Core Module
//!
//! The UI-agnostic media discovery engine.
//!
//! ## Modules
//! - `scanner` - Discovers media in the system index, folder trees, and shares
//! - `identity` - Normalizes raw references to stable dedup keys
//! - `aggregator` - Merges scanner output into the canonical index
//! - `cache` - Persists records across runs for instant warm starts
//! - `timeline` - Day-bucketed presentation projection
//! - `probe` - Existence checks used during cache reconciliation
//! - `config` - Session configuration

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod identity;
pub mod model;
pub mod probe;
pub mod scanner;
pub mod timeline;

// Re-export commonly used types
pub use aggregator::{AggregationEngine, CanonicalIndex};
pub use cache::{CacheRecord, CacheStore, MemoryCacheStore, SqliteCacheStore};
pub use config::{DayOrder, SessionConfig, ShareCredentials};
pub use model::{IdentityHint, Locator, MediaRecord, RawMediaItem, SourceKind};
pub use probe::{ExistenceProbe, FsProbe};
pub use scanner::{
    CancelToken, MediaScanner, NetworkShareScanner, ScannerSink, SystemIndexScanner,
    TreeFolderScanner,
};
pub use timeline::GalleryItem;
