//! Cache store trait definition.

use super::CacheRecord;
use crate::error::CacheError;

/// Trait for persistent cache backends.
///
/// Exactly three access patterns are used by the engine: paged reads during
/// startup reconciliation, batch upserts during live scanning, and batch
/// deletes for stale records. Concrete storage is an implementation detail.
pub trait CacheStore: Send + Sync {
    /// Read one page of records, newest-first in a stable order.
    ///
    /// Rows that fail to deserialize are skipped, never fatal for the page.
    fn page_read(&self, offset: usize, limit: usize) -> Result<Vec<CacheRecord>, CacheError>;

    /// Insert or replace records, keyed by `key`, in a single transaction
    fn upsert(&self, records: &[CacheRecord]) -> Result<(), CacheError>;

    /// Delete records by key; missing keys are ignored
    fn delete_by_keys(&self, keys: &[String]) -> Result<(), CacheError>;
}
