//! Folder-tree scanner built on walkdir.

use super::{now_ms, CancelToken, MediaFilter, MediaScanner, ScannerSink, SCAN_BATCH_SIZE};
use crate::core::identity::PRIMARY_VOLUME_PREFIX;
use crate::core::model::{IdentityHint, Locator, RawMediaItem, SourceKind};
use crate::error::ScanError;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use walkdir::WalkDir;

/// Configuration for one folder-tree scan
#[derive(Debug, Clone)]
pub struct TreeScanConfig {
    /// Root of the tree to walk
    pub root: PathBuf,
    /// Maximum directory depth (0 = unlimited)
    pub max_depth: usize,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Pause after each reported batch, to be gentle on slow mounts.
    /// Defaults to 50 ms; `None` disables pacing.
    pub batch_pause: Option<Duration>,
}

impl TreeScanConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: 0,
            include_hidden: false,
            batch_pause: Some(Duration::from_millis(50)),
        }
    }
}

/// Scanner that recursively walks a local folder tree.
///
/// Single-use: construct one per session.
pub struct TreeFolderScanner {
    config: TreeScanConfig,
    filter: MediaFilter,
    cancel: CancelToken,
    started: bool,
}

impl TreeFolderScanner {
    pub fn new(config: TreeScanConfig) -> Self {
        let filter = MediaFilter::new().with_hidden(config.include_hidden);
        Self {
            config,
            filter,
            cancel: CancelToken::new(),
            started: false,
        }
    }
}

impl MediaScanner for TreeFolderScanner {
    fn source_kind(&self) -> SourceKind {
        SourceKind::TreeFolder
    }

    fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn start_scanning(&mut self, sink: ScannerSink) -> Result<(), ScanError> {
        if self.started {
            return Err(ScanError::AlreadyStarted);
        }
        self.started = true;

        let config = self.config.clone();
        let filter = self.filter.clone();
        let cancel = self.cancel.clone();

        thread::spawn(move || {
            walk_tree(&config, &filter, &cancel, sink);
        });

        Ok(())
    }
}

/// Walk the tree and report batches; the sink completes on return, whether
/// the walk finished, failed, or was cancelled.
fn walk_tree(config: &TreeScanConfig, filter: &MediaFilter, cancel: &CancelToken, sink: ScannerSink) {
    let root = &config.root;
    if !root.is_dir() {
        tracing::warn!(path = %root.display(), "tree root missing or not a directory");
        return;
    }

    let mut walker = WalkDir::new(root).follow_links(false);
    if config.max_depth > 0 {
        walker = walker.max_depth(config.max_depth);
    }

    let include_hidden = config.include_hidden;
    let entries = walker.into_iter().filter_entry(move |entry| {
        // Prune hidden subtrees (the root itself is always entered)
        if include_hidden || entry.depth() == 0 {
            return true;
        }
        entry
            .file_name()
            .to_str()
            .map(|name| !name.starts_with('.'))
            .unwrap_or(true)
    });

    let mut batch: Vec<RawMediaItem> = Vec::new();

    for entry_result in entries {
        if cancel.is_cancelled() {
            return;
        }

        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !filter.should_include(&name) {
            continue;
        }

        batch.push(make_item(entry.path(), root));

        if batch.len() >= SCAN_BATCH_SIZE {
            sink.send_batch(std::mem::take(&mut batch));
            if let Some(pause) = config.batch_pause {
                thread::sleep(pause);
            }
        }
    }

    sink.send_batch(batch);
    sink.complete();
}

fn make_item(path: &Path, root: &Path) -> RawMediaItem {
    let timestamp_ms = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or_else(now_ms);

    let relative = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");

    RawMediaItem {
        locator: Locator::for_file(path),
        source: SourceKind::TreeFolder,
        timestamp_ms,
        identity: Some(IdentityHint::DocumentId(format!(
            "{}{}",
            PRIMARY_VOLUME_PREFIX, relative
        ))),
    }
}
