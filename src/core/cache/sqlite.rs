//! SQLite cache backend for persistent storage.

use super::{CacheRecord, CacheStore};
use crate::core::model::{Locator, SourceKind};
use crate::error::CacheError;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// SQLite-backed persistent cache
///
/// Uses WAL (Write-Ahead Logging) mode for better concurrent access.
/// Rows that fail to deserialize are skipped during reads and remembered
/// for deletion on the next write opportunity.
pub struct SqliteCacheStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    pending_purge: Mutex<Vec<String>>,
}

impl SqliteCacheStore {
    /// Open or create a cache database at the given path
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::OpenFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| CacheError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS media_cache (
                key TEXT PRIMARY KEY,
                locator TEXT NOT NULL,
                album TEXT,
                source_kind TEXT NOT NULL,
                last_modified INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        // Paging reads newest-first
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_media_cache_modified
             ON media_cache(last_modified DESC)",
            [],
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
            pending_purge: Mutex::new(Vec::new()),
        })
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::Corrupted {
            path: self.db_path.clone(),
        })
    }

    /// Delete rows remembered as corrupt during earlier reads
    fn flush_purge(&self, conn: &Connection) {
        let keys: Vec<String> = match self.pending_purge.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => return,
        };

        for key in keys {
            if let Err(e) = conn.execute("DELETE FROM media_cache WHERE key = ?", [&key]) {
                tracing::warn!(key = %key, error = %e, "failed to purge corrupt cache row");
            }
        }
    }
}

impl CacheStore for SqliteCacheStore {
    fn page_read(&self, offset: usize, limit: usize) -> Result<Vec<CacheRecord>, CacheError> {
        let conn = self.lock_conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT key, locator, album, source_kind, last_modified
                 FROM media_cache
                 ORDER BY last_modified DESC, key ASC
                 LIMIT ? OFFSET ?",
            )
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit as i64, offset as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            let (key, locator, album, source_kind, last_modified) = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable cache row");
                    continue;
                }
            };

            let source = match SourceKind::parse(&source_kind) {
                Some(source) => source,
                None => {
                    tracing::warn!(
                        key = %key,
                        source_kind = %source_kind,
                        "skipping cache row with unknown source kind"
                    );
                    if let Ok(mut pending) = self.pending_purge.lock() {
                        pending.push(key);
                    }
                    continue;
                }
            };

            records.push(CacheRecord {
                key,
                locator: Locator::new(locator),
                source,
                timestamp_ms: last_modified,
                album,
            });
        }

        Ok(records)
    }

    fn upsert(&self, records: &[CacheRecord]) -> Result<(), CacheError> {
        let mut conn = self.lock_conn()?;

        let tx = conn
            .transaction()
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO media_cache
                     (key, locator, album, source_kind, last_modified)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

            for record in records {
                stmt.execute(params![
                    record.key,
                    record.locator.as_str(),
                    record.album,
                    record.source.as_str(),
                    record.timestamp_ms,
                ])
                .map_err(|e| CacheError::QueryFailed(e.to_string()))?;
            }
        }
        tx.commit()
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        self.flush_purge(&conn);
        Ok(())
    }

    fn delete_by_keys(&self, keys: &[String]) -> Result<(), CacheError> {
        let mut conn = self.lock_conn()?;

        let tx = conn
            .transaction()
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;
        {
            let mut stmt = tx
                .prepare("DELETE FROM media_cache WHERE key = ?")
                .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

            for key in keys {
                stmt.execute([key])
                    .map_err(|e| CacheError::QueryFailed(e.to_string()))?;
            }
        }
        tx.commit()
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        self.flush_purge(&conn);
        Ok(())
    }
}
