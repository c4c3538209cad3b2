//! Network-share scanner.
//!
//! The wire protocol lives behind [`ShareTransport`]; this module owns the
//! recursive walk, depth limiting, media filtering, and the
//! fail-quietly-and-complete contract. A share that goes away mid-walk ends
//! that scanner early; whatever was already reported remains valid.

use super::{now_ms, CancelToken, MediaFilter, MediaScanner, ScannerSink, SCAN_BATCH_SIZE};
use crate::core::model::{Locator, RawMediaItem, SourceKind};
use crate::error::ScanError;
use std::thread;

/// One directory entry as listed by the transport
#[derive(Debug, Clone)]
pub struct ShareEntry {
    pub name: String,
    pub is_dir: bool,
    /// Modification time in epoch millis, when the transport knows it
    pub modified_ms: Option<i64>,
}

/// Connection to one share, supplied by the host.
///
/// `list` takes a path relative to the share root ("" for the root itself).
pub trait ShareTransport: Send {
    fn connect(&mut self) -> Result<(), ScanError>;
    fn list(&mut self, path: &str) -> Result<Vec<ShareEntry>, ScanError>;
}

/// Configuration for one network-share scan
#[derive(Debug, Clone)]
pub struct ShareScanConfig {
    pub host: String,
    pub share: String,
    /// Path below the share to start from, empty for the share root
    pub root_path: String,
    /// Maximum directory depth (0 = unlimited)
    pub max_depth: usize,
}

/// Scanner that recursively walks a network-share root.
///
/// Single-use: construct one per session.
pub struct NetworkShareScanner {
    config: ShareScanConfig,
    transport: Option<Box<dyn ShareTransport>>,
    filter: MediaFilter,
    cancel: CancelToken,
}

impl NetworkShareScanner {
    pub fn new(config: ShareScanConfig, transport: Box<dyn ShareTransport>) -> Self {
        Self {
            config,
            transport: Some(transport),
            filter: MediaFilter::new(),
            cancel: CancelToken::new(),
        }
    }
}

impl MediaScanner for NetworkShareScanner {
    fn source_kind(&self) -> SourceKind {
        SourceKind::NetworkShare
    }

    fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn start_scanning(&mut self, sink: ScannerSink) -> Result<(), ScanError> {
        let mut transport = self.transport.take().ok_or(ScanError::AlreadyStarted)?;

        let config = self.config.clone();
        let filter = self.filter.clone();
        let cancel = self.cancel.clone();

        thread::spawn(move || {
            let mut batch: Vec<RawMediaItem> = Vec::new();

            let result = transport.connect().and_then(|_| {
                walk_share(
                    transport.as_mut(),
                    &config,
                    &filter,
                    &cancel,
                    &config.root_path,
                    0,
                    &sink,
                    &mut batch,
                )
            });

            if let Err(e) = result {
                tracing::error!(
                    host = %config.host,
                    share = %config.share,
                    error = %e,
                    "share walk ended early"
                );
            }

            sink.send_batch(batch);
            sink.complete();
        });

        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn walk_share(
    transport: &mut dyn ShareTransport,
    config: &ShareScanConfig,
    filter: &MediaFilter,
    cancel: &CancelToken,
    path: &str,
    depth: usize,
    sink: &ScannerSink,
    batch: &mut Vec<RawMediaItem>,
) -> Result<(), ScanError> {
    if cancel.is_cancelled() {
        return Ok(());
    }
    if config.max_depth > 0 && depth > config.max_depth {
        return Ok(());
    }

    for entry in transport.list(path)? {
        if cancel.is_cancelled() {
            return Ok(());
        }

        if entry.name == "." || entry.name == ".." {
            continue;
        }

        let full_path = if path.is_empty() {
            entry.name.clone()
        } else {
            format!("{}/{}", path, entry.name)
        };

        if entry.is_dir {
            walk_share(
                transport, config, filter, cancel, &full_path, depth + 1, sink, batch,
            )?;
        } else if filter.should_include(&entry.name) {
            batch.push(RawMediaItem {
                locator: Locator::for_share(&config.host, &config.share, &full_path),
                source: SourceKind::NetworkShare,
                timestamp_ms: entry.modified_ms.unwrap_or_else(now_ms),
                identity: None,
            });

            if batch.len() >= SCAN_BATCH_SIZE {
                sink.send_batch(std::mem::take(batch));
            }
        }
    }

    Ok(())
}
