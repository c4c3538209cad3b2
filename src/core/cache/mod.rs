//! # Cache Module
//!
//! Persists discovered media so a restart shows results instantly instead of
//! re-scanning slow sources (especially network shares).
//!
//! ## Backends
//! - `SqliteCacheStore` - Persistent storage using SQLite
//! - `MemoryCacheStore` - For tests and cache-less runs

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryCacheStore;
pub use sqlite::SqliteCacheStore;
pub use traits::CacheStore;

use crate::core::model::{Locator, MediaRecord, SourceKind};
use serde::{Deserialize, Serialize};

/// On-disk shadow of a [`MediaRecord`]: same fields, the unit of paged
/// durability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub key: String,
    pub locator: Locator,
    pub source: SourceKind,
    pub timestamp_ms: i64,
    pub album: Option<String>,
}

impl CacheRecord {
    pub fn into_record(self) -> MediaRecord {
        MediaRecord {
            key: self.key,
            locator: self.locator,
            source: self.source,
            timestamp_ms: self.timestamp_ms,
            album: self.album,
        }
    }
}

impl From<&MediaRecord> for CacheRecord {
    fn from(record: &MediaRecord) -> Self {
        Self {
            key: record.key.clone(),
            locator: record.locator.clone(),
            source: record.source,
            timestamp_ms: record.timestamp_ms,
            album: record.album.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_record_round_trips_to_media_record() {
        let record = MediaRecord {
            key: "Pictures/cat.jpg".into(),
            locator: Locator::new("file:///p/Pictures/cat.jpg"),
            source: SourceKind::TreeFolder,
            timestamp_ms: 1_700_000_000_000,
            album: None,
        };

        let cached = CacheRecord::from(&record);
        assert_eq!(cached.into_record(), record);
    }
}
