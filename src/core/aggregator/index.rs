//! The canonical in-memory index: key map plus day buckets.

use crate::core::config::DayOrder;
use crate::core::model::MediaRecord;
use crate::core::timeline::{day_key, GalleryItem};
use std::collections::{BTreeMap, HashMap};

/// Outcome of a successful insert, used to build incremental deltas
#[derive(Debug, Clone)]
pub struct Inserted {
    pub record: MediaRecord,
    /// ISO day-bucket key the record landed in
    pub day: String,
    /// True when this insert created the bucket (a header marker is due)
    pub new_day: bool,
}

/// The authoritative state for one session: an insertion-ordered
/// key→record map and the day-bucket collection, always mutated together.
///
/// One instance is owned by one aggregation engine; there is no process-wide
/// shared index.
pub struct CanonicalIndex {
    records: HashMap<String, MediaRecord>,
    /// Keys in insertion order, per day bucket. BTreeMap keeps day keys
    /// sorted so a reverse walk yields most-recent-day-first.
    buckets: BTreeMap<String, Vec<String>>,
    day_order: DayOrder,
}

impl CanonicalIndex {
    pub fn new(day_order: DayOrder) -> Self {
        Self {
            records: HashMap::new(),
            buckets: BTreeMap::new(),
            day_order,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Insert a record unless its key is already present.
    ///
    /// First writer wins: a later arrival with the same key never replaces
    /// the stored record. Returns `None` for duplicates.
    pub fn insert(&mut self, record: MediaRecord) -> Option<Inserted> {
        if self.records.contains_key(&record.key) {
            return None;
        }

        let day = day_key(record.timestamp_ms);
        let bucket = self.buckets.entry(day.clone()).or_default();
        let new_day = bucket.is_empty();
        bucket.push(record.key.clone());

        let inserted = Inserted {
            record: record.clone(),
            day,
            new_day,
        };
        self.records.insert(record.key.clone(), record);
        Some(inserted)
    }

    /// Remove a record by key, scrubbing it from its day bucket. Empty
    /// buckets are dropped so they never reach the presentation list.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(record) = self.records.remove(key) else {
            return false;
        };

        let day = day_key(record.timestamp_ms);
        if let Some(bucket) = self.buckets.get_mut(&day) {
            bucket.retain(|k| k != key);
            if bucket.is_empty() {
                self.buckets.remove(&day);
            }
        }
        true
    }

    /// Project the full presentation list: day headers most-recent-first,
    /// members per the configured same-day ordering.
    pub fn rebuild(&self) -> Vec<GalleryItem> {
        let mut items = Vec::new();

        for (day, keys) in self.buckets.iter().rev() {
            let mut members: Vec<&MediaRecord> =
                keys.iter().filter_map(|k| self.records.get(k)).collect();

            if members.is_empty() {
                continue;
            }

            if self.day_order == DayOrder::NewestFirst {
                members.sort_by_key(|r| std::cmp::Reverse(r.timestamp_ms));
            }

            items.push(GalleryItem::Header { day: day.clone() });
            items.extend(members.into_iter().map(|r| GalleryItem::Entry(r.clone())));
        }

        items
    }
}
