//! Integration tests for the load-and-index session protocol.
//!
//! These tests verify end-to-end session behavior including:
//! - Cold start against an empty store
//! - Warm start: cache replay before live scanning
//! - Reconciliation of missing files and disabled sources
//! - Bounded paging against the store

use gallery_engine::core::aggregator::{AggregationEngine, CACHE_PAGE_SIZE};
use gallery_engine::core::cache::{CacheRecord, CacheStore, MemoryCacheStore};
use gallery_engine::core::config::SessionConfig;
use gallery_engine::core::model::{Locator, SourceKind};
use gallery_engine::core::probe::FsProbe;
use gallery_engine::core::scanner::{MediaScanner, TreeFolderScanner, TreeScanConfig};
use gallery_engine::error::CacheError;
use gallery_engine::events::{Event, EventChannel, EventReceiver, SessionEvent};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn create_media_file(dir: &Path, name: &str) {
    let mut file = File::create(dir.join(name)).unwrap();
    file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
}

fn tree_config(root: &Path) -> SessionConfig {
    SessionConfig {
        use_system_index: false,
        tree_roots: vec![root.to_path_buf()],
        ..SessionConfig::default()
    }
}

fn tree_scanner(root: &Path) -> Box<dyn MediaScanner> {
    Box::new(TreeFolderScanner::new(TreeScanConfig::new(root)))
}

fn wait_settled(receiver: &EventReceiver) -> Vec<Event> {
    let mut seen = Vec::new();
    loop {
        let event = receiver
            .recv_timeout(Duration::from_secs(10))
            .expect("session did not settle");
        let settled = matches!(event, Event::Session(SessionEvent::Settled { .. }));
        seen.push(event);
        if settled {
            return seen;
        }
    }
}

fn replay_counts(events: &[Event]) -> (usize, usize) {
    events
        .iter()
        .find_map(|e| match e {
            Event::Session(SessionEvent::CacheReplayed { published, purged }) => {
                Some((*published, *purged))
            }
            _ => None,
        })
        .expect("no replay event")
}

/// Store wrapper that counts page reads
struct CountingStore {
    inner: MemoryCacheStore,
    page_reads: AtomicUsize,
}

impl CountingStore {
    fn new(records: Vec<CacheRecord>) -> Self {
        Self {
            inner: MemoryCacheStore::with_records(records),
            page_reads: AtomicUsize::new(0),
        }
    }
}

impl CacheStore for CountingStore {
    fn page_read(&self, offset: usize, limit: usize) -> Result<Vec<CacheRecord>, CacheError> {
        self.page_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.page_read(offset, limit)
    }

    fn upsert(&self, records: &[CacheRecord]) -> Result<(), CacheError> {
        self.inner.upsert(records)
    }

    fn delete_by_keys(&self, keys: &[String]) -> Result<(), CacheError> {
        self.inner.delete_by_keys(keys)
    }
}

fn cached_file_record(dir: &Path, name: &str, timestamp_ms: i64) -> CacheRecord {
    CacheRecord {
        key: name.to_string(),
        locator: Locator::for_file(&dir.join(name)),
        source: SourceKind::TreeFolder,
        timestamp_ms,
        album: None,
    }
}

#[test]
fn cold_start_discovers_every_file_once() {
    let temp = TempDir::new().unwrap();
    for i in 0..63 {
        create_media_file(temp.path(), &format!("img_{:03}.jpg", i));
    }
    // Non-media and hidden files are not discovered
    File::create(temp.path().join("notes.txt")).unwrap();
    create_media_file(temp.path(), ".hidden.jpg");

    let (sender, receiver) = EventChannel::new();
    let store = Arc::new(MemoryCacheStore::new());
    let engine = AggregationEngine::new(
        Arc::clone(&store) as Arc<dyn CacheStore>,
        Arc::new(FsProbe),
        tree_config(temp.path()),
        sender,
    );

    engine.load_then_scan(vec![tree_scanner(temp.path())]);
    let events = wait_settled(&receiver);

    assert_eq!(replay_counts(&events), (0, 0));
    match events.last() {
        Some(Event::Session(SessionEvent::Settled { total_records })) => {
            assert_eq!(*total_records, 63);
        }
        other => panic!("unexpected terminal event: {:?}", other),
    }
    assert_eq!(engine.active_scanner_count(), 0);

    // Everything discovered was also persisted
    drop(engine);
    assert_eq!(store.len(), 63);
}

#[test]
fn warm_start_replays_then_deduplicates_the_rescan() {
    let temp = TempDir::new().unwrap();
    for i in 0..5 {
        create_media_file(temp.path(), &format!("img_{}.jpg", i));
    }

    // First session populates the store
    let store = Arc::new(MemoryCacheStore::new());
    {
        let (sender, receiver) = EventChannel::new();
        let engine = AggregationEngine::new(
            Arc::clone(&store) as Arc<dyn CacheStore>,
            Arc::new(FsProbe),
            tree_config(temp.path()),
            sender,
        );
        engine.load_then_scan(vec![tree_scanner(temp.path())]);
        wait_settled(&receiver);
    }
    assert_eq!(store.len(), 5);

    // Second session: cached records publish first, then the rescan finds
    // the same files and every one collapses onto its cached record.
    let (sender, receiver) = EventChannel::new();
    let engine = AggregationEngine::new(
        Arc::clone(&store) as Arc<dyn CacheStore>,
        Arc::new(FsProbe),
        tree_config(temp.path()),
        sender,
    );
    engine.load_then_scan(vec![tree_scanner(temp.path())]);
    let events = wait_settled(&receiver);

    assert_eq!(replay_counts(&events), (5, 0));
    assert_eq!(engine.record_count(), 5);
    drop(engine);
    assert_eq!(store.len(), 5);
}

#[test]
fn missing_files_are_reconciled_with_bounded_paging() {
    let temp = TempDir::new().unwrap();

    // 150 cached records spanning two pages, paged newest-first. The ten
    // newest point at files that no longer exist on disk, so the first page
    // carries 90 resolvable + 10 unresolvable and the second all 50.
    let mut records = Vec::new();
    for i in 0..150 {
        let name = format!("img_{:03}.jpg", i);
        if i < 140 {
            create_media_file(temp.path(), &name);
        }
        records.push(cached_file_record(temp.path(), &name, i as i64));
    }
    let store = Arc::new(CountingStore::new(records));

    let (sender, receiver) = EventChannel::new();
    let engine = AggregationEngine::new(
        Arc::clone(&store) as Arc<dyn CacheStore>,
        Arc::new(FsProbe),
        tree_config(temp.path()),
        sender,
    );

    // No scanners: this session is replay-only
    engine.load_then_scan(Vec::new());
    let events = wait_settled(&receiver);

    assert_eq!(replay_counts(&events), (140, 10));
    assert_eq!(engine.record_count(), 140);
    assert_eq!(store.inner.len(), 140);

    // 150 rows at a page size of 100 is exactly two reads
    assert_eq!(CACHE_PAGE_SIZE, 100);
    assert_eq!(store.page_reads.load(Ordering::SeqCst), 2);
}

#[test]
fn records_from_a_disabled_source_are_purged() {
    let temp = TempDir::new().unwrap();
    create_media_file(temp.path(), "local.jpg");

    let mut records = vec![cached_file_record(temp.path(), "local.jpg", 1)];
    for i in 0..5 {
        records.push(CacheRecord {
            key: format!("smb://nas.local/media/{}.jpg", i),
            locator: Locator::for_share("nas.local", "media", &format!("{}.jpg", i)),
            source: SourceKind::NetworkShare,
            timestamp_ms: 100 + i,
            album: None,
        });
    }
    let store = Arc::new(MemoryCacheStore::with_records(records));

    // Configuration carries no share credentials, so every share-origin
    // record is purged without any reachability check.
    let (sender, receiver) = EventChannel::new();
    let engine = AggregationEngine::new(
        Arc::clone(&store) as Arc<dyn CacheStore>,
        Arc::new(FsProbe),
        tree_config(temp.path()),
        sender,
    );

    engine.load_then_scan(Vec::new());
    let events = wait_settled(&receiver);

    assert_eq!(replay_counts(&events), (1, 5));
    assert_eq!(store.len(), 1);
    let survivors = store.page_read(0, 10).unwrap();
    assert_eq!(survivors[0].source, SourceKind::TreeFolder);
}
