//! System-index scanner: drains the platform's own media index.

use super::{CancelToken, MediaScanner, ScannerSink, SCAN_BATCH_SIZE};
use crate::core::model::{IdentityHint, Locator, RawMediaItem, SourceKind};
use crate::error::ScanError;
use std::sync::Arc;
use std::thread;

/// One media row from the system index
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Stable row id, used to build the locator
    pub id: i64,
    pub display_name: String,
    /// Relative path within the indexed storage, trailing separator included
    pub relative_path: String,
    /// Capture time in epoch millis, when the index knows it
    pub taken_ms: Option<i64>,
    /// Modification time in epoch seconds
    pub modified_secs: i64,
}

impl IndexEntry {
    /// Best-effort timestamp: capture time if known, else modification time
    pub fn timestamp_ms(&self) -> i64 {
        match self.taken_ms {
            Some(taken) if taken > 0 => taken,
            _ => self.modified_secs * 1000,
        }
    }
}

/// The platform media index, supplied by the host.
///
/// Implementations return image and video rows only, newest-added-first.
pub trait SystemIndex: Send + Sync {
    fn query_media(&self) -> Result<Vec<IndexEntry>, ScanError>;
}

/// Scanner that reports everything the system index already knows about.
///
/// Single-use: construct one per session.
pub struct SystemIndexScanner {
    index: Arc<dyn SystemIndex>,
    cancel: CancelToken,
    started: bool,
}

impl SystemIndexScanner {
    pub fn new(index: Arc<dyn SystemIndex>) -> Self {
        Self {
            index,
            cancel: CancelToken::new(),
            started: false,
        }
    }
}

impl MediaScanner for SystemIndexScanner {
    fn source_kind(&self) -> SourceKind {
        SourceKind::SystemIndex
    }

    fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn start_scanning(&mut self, sink: ScannerSink) -> Result<(), ScanError> {
        if self.started {
            return Err(ScanError::AlreadyStarted);
        }
        self.started = true;

        let index = Arc::clone(&self.index);
        let cancel = self.cancel.clone();

        thread::spawn(move || {
            let rows = match index.query_media() {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::error!(error = %e, "system index query failed");
                    return; // sink drop signals completion
                }
            };

            let mut batch: Vec<RawMediaItem> = Vec::new();
            for row in rows {
                if cancel.is_cancelled() {
                    return;
                }

                batch.push(RawMediaItem {
                    locator: Locator::for_system_index(row.id),
                    source: SourceKind::SystemIndex,
                    timestamp_ms: row.timestamp_ms(),
                    identity: Some(IdentityHint::NamePath {
                        relative_path: row.relative_path,
                        name: row.display_name,
                    }),
                });

                if batch.len() >= SCAN_BATCH_SIZE {
                    sink.send_batch(std::mem::take(&mut batch));
                }
            }

            sink.send_batch(batch);
            sink.complete();
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::ScannerMessage;
    use crossbeam_channel::unbounded;

    struct FakeIndex {
        rows: Vec<IndexEntry>,
    }

    impl SystemIndex for FakeIndex {
        fn query_media(&self) -> Result<Vec<IndexEntry>, ScanError> {
            Ok(self.rows.clone())
        }
    }

    struct FailingIndex;

    impl SystemIndex for FailingIndex {
        fn query_media(&self) -> Result<Vec<IndexEntry>, ScanError> {
            Err(ScanError::ReadDirectory {
                path: "/".into(),
                source: std::io::Error::other("index unavailable"),
            })
        }
    }

    fn entry(id: i64) -> IndexEntry {
        IndexEntry {
            id,
            display_name: format!("IMG_{:04}.jpg", id),
            relative_path: "DCIM/Camera/".into(),
            taken_ms: None,
            modified_secs: 1_700_000_000,
        }
    }

    fn drain(rx: crossbeam_channel::Receiver<ScannerMessage>) -> (Vec<RawMediaItem>, usize) {
        let mut items = Vec::new();
        let mut completions = 0;
        for message in rx {
            match message {
                ScannerMessage::Batch { items: batch, .. } => items.extend(batch),
                ScannerMessage::Completed { .. } => {
                    completions += 1;
                    break;
                }
            }
        }
        (items, completions)
    }

    #[test]
    fn reports_rows_in_bounded_batches() {
        let rows: Vec<IndexEntry> = (0..120).map(entry).collect();
        let (tx, rx) = unbounded();
        let mut scanner = SystemIndexScanner::new(Arc::new(FakeIndex { rows }));
        scanner
            .start_scanning(ScannerSink::new(tx, 0, SourceKind::SystemIndex))
            .unwrap();

        let (items, completions) = drain(rx);
        assert_eq!(items.len(), 120);
        assert_eq!(completions, 1);
    }

    #[test]
    fn items_carry_name_path_hints() {
        let (tx, rx) = unbounded();
        let mut scanner = SystemIndexScanner::new(Arc::new(FakeIndex {
            rows: vec![entry(7)],
        }));
        scanner
            .start_scanning(ScannerSink::new(tx, 0, SourceKind::SystemIndex))
            .unwrap();

        let (items, _) = drain(rx);
        assert_eq!(items[0].locator.as_str(), "mediastore://7");
        match &items[0].identity {
            Some(IdentityHint::NamePath {
                relative_path,
                name,
            }) => {
                assert_eq!(relative_path, "DCIM/Camera/");
                assert_eq!(name, "IMG_0007.jpg");
            }
            other => panic!("unexpected identity hint: {:?}", other),
        }
    }

    #[test]
    fn capture_time_wins_over_modification_time() {
        let row = IndexEntry {
            taken_ms: Some(1_600_000_000_000),
            ..entry(1)
        };
        assert_eq!(row.timestamp_ms(), 1_600_000_000_000);

        let row = IndexEntry {
            taken_ms: Some(0),
            ..entry(1)
        };
        assert_eq!(row.timestamp_ms(), 1_700_000_000_000);
    }

    #[test]
    fn query_failure_still_completes() {
        let (tx, rx) = unbounded();
        let mut scanner = SystemIndexScanner::new(Arc::new(FailingIndex));
        scanner
            .start_scanning(ScannerSink::new(tx, 0, SourceKind::SystemIndex))
            .unwrap();

        let (items, completions) = drain(rx);
        assert!(items.is_empty());
        assert_eq!(completions, 1);
    }
}
