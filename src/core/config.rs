//! Session configuration.
//!
//! Plain values consumed at session-start time; the core never persists
//! configuration itself.

use crate::core::model::SourceKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ordering policy for items that share a calendar day.
///
/// Different iterations of this design disagreed on same-day ordering, so it
/// is a configuration choice rather than a fixed law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DayOrder {
    /// Discovery (insertion) order within a day
    #[default]
    Insertion,
    /// Most recent timestamp first within a day
    NewestFirst,
}

/// Credentials for one network-share root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareCredentials {
    pub host: String,
    pub share: String,
    pub username: String,
    pub password: String,
    /// Path below the share to start from, empty for the share root
    pub root_path: String,
}

/// Configuration for one load-and-index session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Whether the system media index source is enabled
    pub use_system_index: bool,
    /// Folder-tree roots to scan
    pub tree_roots: Vec<PathBuf>,
    /// Network shares to scan; empty means the source is disabled
    pub share_credentials: Vec<ShareCredentials>,
    /// Maximum recursion depth for tree and share walks (0 = unlimited)
    pub max_depth: usize,
    /// Same-day ordering policy for the presentation list
    pub day_order: DayOrder,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            use_system_index: true,
            tree_roots: Vec::new(),
            share_credentials: Vec::new(),
            max_depth: 0,
            day_order: DayOrder::default(),
        }
    }
}

impl SessionConfig {
    /// Whether records originating from `kind` are still eligible under the
    /// current configuration. Gates cache replay: a record whose source has
    /// been turned off is purged rather than republished.
    pub fn source_enabled(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::SystemIndex => self.use_system_index,
            SourceKind::TreeFolder => !self.tree_roots.is_empty(),
            SourceKind::NetworkShare => !self.share_credentials.is_empty(),
        }
    }
}
