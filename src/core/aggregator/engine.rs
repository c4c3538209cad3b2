//! The aggregation engine: owns the canonical index and runs load-and-index
//! sessions against it.

use super::index::CanonicalIndex;
use crate::core::cache::{CacheRecord, CacheStore};
use crate::core::config::SessionConfig;
use crate::core::identity;
use crate::core::model::MediaRecord;
use crate::core::probe::ExistenceProbe;
use crate::core::scanner::{CancelToken, MediaScanner, ScannerMessage, ScannerSink};
use crate::core::timeline::GalleryItem;
use crate::events::{Event, EventSender, SessionEvent, TimelineUpdate};
use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Rows pulled from the cache store per replay read
pub const CACHE_PAGE_SIZE: usize = 100;

/// How often the collector checks for session cancellation while idle
const COLLECT_POLL: Duration = Duration::from_millis(100);

/// Work handed to the dedicated store-writer thread. Cache writes ride a
/// separate thread so a slow disk never stalls merging.
enum StoreOp {
    Upsert(Vec<CacheRecord>),
}

/// Orchestrates one load-and-index session at a time.
///
/// A session runs in two phases on a dedicated driver thread: replay the
/// cache store page by page (publishing full rebuilds), then start every
/// scanner and merge their batches as incremental deltas. Starting a new
/// session cancels the previous one first, so at most one session ever
/// mutates the index.
pub struct AggregationEngine {
    index: Arc<Mutex<CanonicalIndex>>,
    store: Arc<dyn CacheStore>,
    probe: Arc<dyn ExistenceProbe>,
    config: SessionConfig,
    events: EventSender,
    /// Cancel tokens for scanners belonging to the current session
    active: Arc<Mutex<Vec<CancelToken>>>,
    session_cancel: Mutex<Option<CancelToken>>,
    driver: Mutex<Option<JoinHandle<()>>>,
    store_tx: Option<Sender<StoreOp>>,
    writer: Option<JoinHandle<()>>,
}

/// Index locks are only ever held for short, non-panicking critical
/// sections; if one does get poisoned the data is still coherent enough
/// to keep serving.
fn lock_index(index: &Mutex<CanonicalIndex>) -> MutexGuard<'_, CanonicalIndex> {
    index.lock().unwrap_or_else(|e| e.into_inner())
}

impl AggregationEngine {
    pub fn new(
        store: Arc<dyn CacheStore>,
        probe: Arc<dyn ExistenceProbe>,
        config: SessionConfig,
        events: EventSender,
    ) -> Self {
        let (store_tx, store_rx) = unbounded::<StoreOp>();
        let writer_store = Arc::clone(&store);
        let writer = thread::spawn(move || {
            for op in store_rx {
                match op {
                    StoreOp::Upsert(records) => {
                        if let Err(e) = writer_store.upsert(&records) {
                            tracing::warn!(
                                count = records.len(),
                                error = %e,
                                "cache upsert failed"
                            );
                        }
                    }
                }
            }
        });

        Self {
            index: Arc::new(Mutex::new(CanonicalIndex::new(config.day_order))),
            store,
            probe,
            config,
            events,
            active: Arc::new(Mutex::new(Vec::new())),
            session_cancel: Mutex::new(None),
            driver: Mutex::new(None),
            store_tx: Some(store_tx),
            writer: Some(writer),
        }
    }

    /// Current presentation list
    pub fn snapshot(&self) -> Vec<GalleryItem> {
        lock_index(&self.index).rebuild()
    }

    /// Number of records in the canonical index
    pub fn record_count(&self) -> usize {
        lock_index(&self.index).len()
    }

    /// Number of scanners the current session still considers active.
    /// Returns to zero once a session settles.
    pub fn active_scanner_count(&self) -> usize {
        self.active.lock().map(|active| active.len()).unwrap_or(0)
    }

    /// Start a load-and-index session: cancel any previous session, reset the
    /// index, replay the cache store, then run the given scanners to
    /// completion. Returns once the session is started; progress arrives
    /// through the event channel, ending with [`SessionEvent::Settled`].
    pub fn load_then_scan(&self, scanners: Vec<Box<dyn MediaScanner>>) {
        self.stop();
        self.join_driver();

        let session_cancel = CancelToken::new();
        if let Ok(mut slot) = self.session_cancel.lock() {
            *slot = Some(session_cancel.clone());
        }

        *lock_index(&self.index) = CanonicalIndex::new(self.config.day_order);
        self.events.send(Event::Session(SessionEvent::Started));

        let index = Arc::clone(&self.index);
        let store = Arc::clone(&self.store);
        let probe = Arc::clone(&self.probe);
        let config = self.config.clone();
        let events = self.events.clone();
        let active = Arc::clone(&self.active);
        let store_tx = self.store_tx.clone();

        let handle = thread::spawn(move || {
            run_session(
                &index,
                store.as_ref(),
                probe.as_ref(),
                &config,
                &events,
                &active,
                &session_cancel,
                store_tx,
                scanners,
            );
        });

        if let Ok(mut driver) = self.driver.lock() {
            *driver = Some(handle);
        }
    }

    /// Cancel the running session, if any. Scanners stop at their next
    /// cancellation check; the session still settles normally.
    pub fn stop(&self) {
        if let Ok(mut slot) = self.session_cancel.lock() {
            if let Some(token) = slot.take() {
                token.cancel();
            }
        }
        if let Ok(mut active) = self.active.lock() {
            for token in active.drain(..) {
                token.cancel();
            }
        }
    }

    fn join_driver(&self) {
        let handle = match self.driver.lock() {
            Ok(mut driver) => driver.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("session driver thread panicked");
            }
        }
    }
}

impl Drop for AggregationEngine {
    fn drop(&mut self) {
        self.stop();
        self.join_driver();
        // Closing the channel lets the writer drain and exit
        self.store_tx = None;
        if let Some(writer) = self.writer.take() {
            if writer.join().is_err() {
                tracing::error!("store writer thread panicked");
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_session(
    index: &Mutex<CanonicalIndex>,
    store: &dyn CacheStore,
    probe: &dyn ExistenceProbe,
    config: &SessionConfig,
    events: &EventSender,
    active: &Mutex<Vec<CancelToken>>,
    session_cancel: &CancelToken,
    store_tx: Option<Sender<StoreOp>>,
    scanners: Vec<Box<dyn MediaScanner>>,
) {
    let (published, purged) = replay_cache(index, store, probe, config, events, session_cancel);
    events.send(Event::Session(SessionEvent::CacheReplayed { published, purged }));

    run_scanners(index, events, active, session_cancel, store_tx, scanners);

    events.send(Event::Session(SessionEvent::Settled {
        total_records: lock_index(index).len(),
    }));
}

/// Phase one: page through the cache store serially, republishing records
/// that still qualify and collecting the keys of those that do not.
///
/// Stale keys are deleted in one batch after paging finishes, so offsets
/// stay stable against the store for the whole walk.
fn replay_cache(
    index: &Mutex<CanonicalIndex>,
    store: &dyn CacheStore,
    probe: &dyn ExistenceProbe,
    config: &SessionConfig,
    events: &EventSender,
    session_cancel: &CancelToken,
) -> (usize, usize) {
    let mut offset = 0;
    let mut published = 0;
    let mut stale: Vec<String> = Vec::new();

    loop {
        if session_cancel.is_cancelled() {
            break;
        }

        let page = match store.page_read(offset, CACHE_PAGE_SIZE) {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(offset, error = %e, "cache replay aborted");
                break;
            }
        };
        let page_len = page.len();
        if page_len == 0 {
            break;
        }

        let mut changed = false;
        let mut snapshot = Vec::new();
        {
            let mut idx = lock_index(index);
            for cached in page {
                let record = cached.into_record();
                if config.source_enabled(record.source) && probe.exists(&record.locator) {
                    if idx.insert(record).is_some() {
                        published += 1;
                        changed = true;
                    }
                } else {
                    tracing::debug!(key = %record.key, source = %record.source, "stale cache record");
                    idx.remove(&record.key);
                    stale.push(record.key);
                }
            }
            if changed {
                snapshot = idx.rebuild();
            }
        }
        if changed {
            events.send(Event::Timeline(TimelineUpdate::Replaced { items: snapshot }));
        }

        if page_len < CACHE_PAGE_SIZE {
            break;
        }
        offset += page_len;
    }

    let purged = stale.len();
    if !stale.is_empty() {
        if let Err(e) = store.delete_by_keys(&stale) {
            tracing::warn!(count = purged, error = %e, "failed to purge stale cache records");
        } else {
            tracing::info!(count = purged, "purged stale cache records");
        }
    }

    (published, purged)
}

/// Phase two: start every scanner and collect their output until each has
/// sent its completion signal.
fn run_scanners(
    index: &Mutex<CanonicalIndex>,
    events: &EventSender,
    active: &Mutex<Vec<CancelToken>>,
    session_cancel: &CancelToken,
    store_tx: Option<Sender<StoreOp>>,
    scanners: Vec<Box<dyn MediaScanner>>,
) {
    let expected = scanners.len();
    if expected == 0 {
        return;
    }

    let (tx, rx) = unbounded::<ScannerMessage>();
    for (scanner_id, mut scanner) in scanners.into_iter().enumerate() {
        let sink = ScannerSink::new(tx.clone(), scanner_id, scanner.source_kind());
        let token = scanner.cancel_token();
        // The session may have been cancelled before this point; the worker
        // then exits at its first token check.
        if session_cancel.is_cancelled() {
            token.cancel();
        }
        if let Ok(mut active) = active.lock() {
            active.push(token);
        }
        // A failed start drops the sink, which still delivers the
        // completion signal, so the count below stays correct.
        if let Err(e) = scanner.start_scanning(sink) {
            tracing::error!(source = %scanner.source_kind(), error = %e, "scanner failed to start");
        }
    }
    drop(tx);

    let mut completed = 0;
    while completed < expected {
        match rx.recv_timeout(COLLECT_POLL) {
            Ok(ScannerMessage::Batch { source, items, .. }) => {
                tracing::debug!(source = %source, count = items.len(), "merging batch");
                merge_batch(index, events, store_tx.as_ref(), items);
            }
            Ok(ScannerMessage::Completed { source, .. }) => {
                completed += 1;
                tracing::info!(source = %source, completed, expected, "scanner finished");
                events.send(Event::Session(SessionEvent::ScannerFinished { source }));
            }
            Err(RecvTimeoutError::Timeout) => {
                if session_cancel.is_cancelled() {
                    // Re-assert cancellation, then keep draining until every
                    // worker has sent its completion signal
                    if let Ok(active) = active.lock() {
                        for token in active.iter() {
                            token.cancel();
                        }
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if let Ok(mut active) = active.lock() {
        active.clear();
    }
}

/// Merge one scanner batch under a single index lock, then publish the
/// resulting delta and queue fresh records for the store writer.
fn merge_batch(
    index: &Mutex<CanonicalIndex>,
    events: &EventSender,
    store_tx: Option<&Sender<StoreOp>>,
    items: Vec<crate::core::model::RawMediaItem>,
) {
    let mut delta: Vec<GalleryItem> = Vec::new();
    let mut fresh: Vec<CacheRecord> = Vec::new();

    {
        let mut idx = lock_index(index);
        for raw in items {
            let key = identity::normalize(&raw);
            let record = MediaRecord {
                key,
                locator: raw.locator,
                source: raw.source,
                timestamp_ms: raw.timestamp_ms,
                album: None,
            };
            if let Some(inserted) = idx.insert(record) {
                if inserted.new_day {
                    delta.push(GalleryItem::Header {
                        day: inserted.day,
                    });
                }
                fresh.push(CacheRecord::from(&inserted.record));
                delta.push(GalleryItem::Entry(inserted.record));
            }
        }
    }

    if !delta.is_empty() {
        events.send(Event::Timeline(TimelineUpdate::Appended { items: delta }));
    }
    if !fresh.is_empty() {
        if let Some(tx) = store_tx {
            let _ = tx.send(StoreOp::Upsert(fresh));
        }
    }
}
