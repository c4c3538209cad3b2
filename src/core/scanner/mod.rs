//! # Scanner Module
//!
//! Discovers media references from heterogeneous sources.
//!
//! ## Variants
//! - [`SystemIndexScanner`] - drains the platform media index
//! - [`TreeFolderScanner`] - walks a user-chosen folder tree
//! - [`NetworkShareScanner`] - walks a network-share root
//!
//! ## Contract
//! A scanner is configured once at construction and is single-use.
//! `start_scanning` begins work on a dedicated worker thread and returns
//! immediately; `stop` requests cooperative cancellation through a polled
//! token. Output is zero or more bounded batches followed by exactly one
//! completion signal - always, even after an internal I/O failure or
//! cancellation. The [`ScannerSink`] enforces the completion invariant
//! structurally: dropping it signals completion.

mod filter;
mod share;
mod system;
mod tree;

pub use filter::{MediaFilter, MediaKind};
pub use share::{NetworkShareScanner, ShareEntry, ShareScanConfig, ShareTransport};
pub use system::{IndexEntry, SystemIndex, SystemIndexScanner};
pub use tree::{TreeFolderScanner, TreeScanConfig};

use crate::core::model::{RawMediaItem, SourceKind};
use crate::error::ScanError;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Upper bound on a single reported batch
pub const SCAN_BATCH_SIZE: usize = 50;

/// Discovery-time fallback for items without a usable timestamp
pub(crate) fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Cooperative cancellation flag, polled by scanners at directory and batch
/// boundaries. Cancellation is best-effort: a scanner may report a small
/// number of additional items after `cancel` returns.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Messages flowing from scanner workers to the aggregation engine
#[derive(Debug)]
pub enum ScannerMessage {
    /// A batch of discovered items, in discovery order
    Batch {
        scanner_id: usize,
        source: SourceKind,
        items: Vec<RawMediaItem>,
    },
    /// The scanner's single terminal signal
    Completed {
        scanner_id: usize,
        source: SourceKind,
    },
}

/// The engine-facing end of one scanner's output.
///
/// Guarantees the exactly-one-completion protocol: `complete` sends the
/// terminal signal, and dropping an uncompleted sink (worker panic, early
/// return on I/O failure) sends it too.
pub struct ScannerSink {
    sender: Sender<ScannerMessage>,
    scanner_id: usize,
    source: SourceKind,
    completed: bool,
}

impl ScannerSink {
    pub fn new(sender: Sender<ScannerMessage>, scanner_id: usize, source: SourceKind) -> Self {
        Self {
            sender,
            scanner_id,
            source,
            completed: false,
        }
    }

    /// Report a batch of discovered items. Empty batches are dropped.
    pub fn send_batch(&self, items: Vec<RawMediaItem>) {
        if items.is_empty() {
            return;
        }
        let _ = self.sender.send(ScannerMessage::Batch {
            scanner_id: self.scanner_id,
            source: self.source,
            items,
        });
    }

    /// Signal completion explicitly
    pub fn complete(mut self) {
        self.mark_complete();
    }

    fn mark_complete(&mut self) {
        if !self.completed {
            self.completed = true;
            let _ = self.sender.send(ScannerMessage::Completed {
                scanner_id: self.scanner_id,
                source: self.source,
            });
        }
    }
}

impl Drop for ScannerSink {
    fn drop(&mut self) {
        self.mark_complete();
    }
}

/// Trait for media source scanners
///
/// Implement this trait to add sources (or test doubles).
pub trait MediaScanner: Send {
    /// Which source variant this scanner represents
    fn source_kind(&self) -> SourceKind;

    /// The token `stop` flips; the engine keeps a copy so it can cancel a
    /// whole session at once
    fn cancel_token(&self) -> CancelToken;

    /// Begin asynchronous discovery on a dedicated worker and return
    /// immediately. Fails with [`ScanError::AlreadyStarted`] on reuse.
    fn start_scanning(&mut self, sink: ScannerSink) -> Result<(), ScanError>;

    /// Request cooperative cancellation
    fn stop(&self) {
        self.cancel_token().cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn cancel_token_starts_clear() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn sink_sends_exactly_one_completion_on_explicit_complete() {
        let (tx, rx) = unbounded();
        let sink = ScannerSink::new(tx, 0, SourceKind::TreeFolder);
        sink.complete();

        let mut completions = 0;
        while let Ok(msg) = rx.try_recv() {
            if matches!(msg, ScannerMessage::Completed { .. }) {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
    }

    #[test]
    fn dropped_sink_still_signals_completion() {
        let (tx, rx) = unbounded();
        {
            let _sink = ScannerSink::new(tx, 3, SourceKind::NetworkShare);
            // dropped without completing, e.g. after an I/O failure
        }
        match rx.try_recv().unwrap() {
            ScannerMessage::Completed { scanner_id, source } => {
                assert_eq!(scanner_id, 3);
                assert_eq!(source, SourceKind::NetworkShare);
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn empty_batches_are_not_sent() {
        let (tx, rx) = unbounded();
        let sink = ScannerSink::new(tx, 0, SourceKind::TreeFolder);
        sink.send_batch(Vec::new());
        assert!(rx.try_recv().is_err());
        sink.complete();
    }
}
