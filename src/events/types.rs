//! Event type definitions for timeline delivery and session progress.

use crate::core::model::SourceKind;
use crate::core::timeline::GalleryItem;
use serde::{Deserialize, Serialize};

/// All events emitted by the aggregation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Presentation-list updates
    Timeline(TimelineUpdate),
    /// Session lifecycle events
    Session(SessionEvent),
}

/// Updates to the presentation list.
///
/// Cache replay and session restarts push full rebuilds; live scanning pushes
/// incremental deltas only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TimelineUpdate {
    /// Replace the whole list with this snapshot
    Replaced { items: Vec<GalleryItem> },
    /// Append these headers and items, in the order they were inserted
    Appended { items: Vec<GalleryItem> },
}

/// Session lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A new load-and-index session has begun
    Started,
    /// Cache replay finished: `published` records went live, `purged` stale
    /// records were deleted from the store
    CacheReplayed { published: usize, purged: usize },
    /// One scanner signalled completion
    ScannerFinished { source: SourceKind },
    /// Every scanner has completed; no further updates will follow
    Settled { total_records: usize },
}
