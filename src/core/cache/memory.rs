//! In-memory cache backend for tests and cache-less runs.

use super::{CacheRecord, CacheStore};
use crate::error::CacheError;
use std::cmp::Reverse;
use std::sync::Mutex;

/// Cache store that keeps everything in memory. Paging order matches the
/// SQLite backend: newest-first, key as the tie-breaker.
#[derive(Default)]
pub struct MemoryCacheStore {
    rows: Mutex<Vec<CacheRecord>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, for tests
    pub fn with_records(records: Vec<CacheRecord>) -> Self {
        Self {
            rows: Mutex::new(records),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCacheStore {
    fn page_read(&self, offset: usize, limit: usize) -> Result<Vec<CacheRecord>, CacheError> {
        let rows = self
            .rows
            .lock()
            .map_err(|_| CacheError::QueryFailed("poisoned lock".to_string()))?;

        let mut sorted: Vec<CacheRecord> = rows.clone();
        sorted.sort_by_key(|r| (Reverse(r.timestamp_ms), r.key.clone()));

        Ok(sorted.into_iter().skip(offset).take(limit).collect())
    }

    fn upsert(&self, records: &[CacheRecord]) -> Result<(), CacheError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| CacheError::QueryFailed("poisoned lock".to_string()))?;

        for record in records {
            match rows.iter_mut().find(|r| r.key == record.key) {
                Some(existing) => *existing = record.clone(),
                None => rows.push(record.clone()),
            }
        }
        Ok(())
    }

    fn delete_by_keys(&self, keys: &[String]) -> Result<(), CacheError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| CacheError::QueryFailed("poisoned lock".to_string()))?;

        rows.retain(|r| !keys.contains(&r.key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Locator, SourceKind};

    fn record(key: &str, timestamp_ms: i64) -> CacheRecord {
        CacheRecord {
            key: key.to_string(),
            locator: Locator::new(format!("file:///photos/{}", key)),
            source: SourceKind::TreeFolder,
            timestamp_ms,
            album: None,
        }
    }

    #[test]
    fn pages_newest_first() {
        let store =
            MemoryCacheStore::with_records(vec![record("old.jpg", 1), record("new.jpg", 2)]);

        let page = store.page_read(0, 10).unwrap();
        assert_eq!(page[0].key, "new.jpg");
        assert_eq!(page[1].key, "old.jpg");
    }

    #[test]
    fn upsert_replaces_existing_key() {
        let store = MemoryCacheStore::new();
        store.upsert(&[record("a.jpg", 1)]).unwrap();
        store.upsert(&[record("a.jpg", 2)]).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.page_read(0, 10).unwrap()[0].timestamp_ms, 2);
    }

    #[test]
    fn delete_ignores_missing_keys() {
        let store = MemoryCacheStore::with_records(vec![record("a.jpg", 1)]);
        store
            .delete_by_keys(&["a.jpg".to_string(), "ghost.jpg".to_string()])
            .unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn paging_walks_the_whole_store() {
        let records: Vec<CacheRecord> =
            (0..7).map(|i| record(&format!("{}.jpg", i), i as i64)).collect();
        let store = MemoryCacheStore::with_records(records);

        let mut total = 0;
        let mut offset = 0;
        loop {
            let page = store.page_read(offset, 3).unwrap();
            if page.is_empty() {
                break;
            }
            total += page.len();
            offset += 3;
        }
        assert_eq!(total, 7);
    }
}
