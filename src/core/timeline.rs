//! Presentation projection: the flat header/item sequence consumed by UIs.

use crate::core::model::MediaRecord;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One element of the flat presentation list: a day header followed by the
/// items belonging to that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GalleryItem {
    /// Start of a calendar-day group, labelled with the ISO day string
    Header { day: String },
    /// A single media item
    Entry(MediaRecord),
}

impl GalleryItem {
    pub fn is_header(&self) -> bool {
        matches!(self, GalleryItem::Header { .. })
    }
}

/// The ISO `YYYY-MM-DD` day-bucket key for a timestamp.
///
/// UTC, so grouping is independent of the host timezone. Timestamps outside
/// the representable range collapse into the epoch day bucket.
pub fn day_key(timestamp_ms: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_ms).single() {
        Some(datetime) => datetime.format("%Y-%m-%d").to_string(),
        None => "1970-01-01".to_string(),
    }
}
