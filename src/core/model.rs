//! Core data model: locators, raw scanner output, and canonical records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Which scanner variant produced an item.
///
/// Persisted with every cache record and used for settings-gating when the
/// cache is replayed on the next start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// The platform's own media index
    SystemIndex,
    /// A user-chosen folder tree
    TreeFolder,
    /// A network share root
    NetworkShare,
}

impl SourceKind {
    /// Stable string form used for on-disk storage
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::SystemIndex => "system-index",
            SourceKind::TreeFolder => "tree-folder",
            SourceKind::NetworkShare => "network-share",
        }
    }

    /// Parse the on-disk string form. Unknown strings are rejected so that
    /// corrupt rows can be detected instead of silently misclassified.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system-index" => Some(SourceKind::SystemIndex),
            "tree-folder" => Some(SourceKind::TreeFolder),
            "network-share" => Some(SourceKind::NetworkShare),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URI-like address used to resolve and display an item.
///
/// The same physical file can be reached through different locator shapes
/// depending on which source found it (`file://...`, `mediastore://...`,
/// `smb://host/share/...`); deduplication happens on the normalized key,
/// never on the locator itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// A locator for a local filesystem path
    pub fn for_file(path: &Path) -> Self {
        Self(format!("file://{}", path.display()))
    }

    /// A locator for a row in the system media index
    pub fn for_system_index(id: i64) -> Self {
        Self(format!("mediastore://{}", id))
    }

    /// A locator for a file on a network share
    pub fn for_share(host: &str, share: &str, relative_path: &str) -> Self {
        let clean = relative_path.strip_prefix('/').unwrap_or(relative_path);
        Self(format!("smb://{}/{}/{}", host, share, clean))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The scheme before `://`, if the locator has one
    pub fn scheme(&self) -> Option<&str> {
        self.0.split_once("://").map(|(scheme, _)| scheme)
    }

    /// Everything after `://`, if the locator has a scheme
    pub fn path(&self) -> Option<&str> {
        self.0.split_once("://").map(|(_, path)| path)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source-specific metadata a scanner can attach to help the identity
/// normalizer compute a stable key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityHint {
    /// Stable display-name + relative-path pair from the system index
    NamePath { relative_path: String, name: String },
    /// A document-tree style id, possibly carrying a volume prefix
    DocumentId(String),
}

/// A single discovered item as reported by a scanner, before identity
/// normalization and deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMediaItem {
    pub locator: Locator,
    pub source: SourceKind,
    /// Best-effort: capture time if known, else modification time, else
    /// discovery time
    pub timestamp_ms: i64,
    pub identity: Option<IdentityHint>,
}

/// The canonical unit of the index: one deduplicated media item.
///
/// Records are replace-only: once a key is inserted it is never overwritten
/// by a later arrival with the same key, and a record is only ever destroyed
/// by reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Normalized identity, unique within the canonical index
    pub key: String,
    pub locator: Locator,
    pub source: SourceKind,
    /// Epoch millis, used only for day grouping and ordering
    pub timestamp_ms: i64,
    /// Reserved; not populated by current scanners
    pub album: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_kind_round_trips_through_storage_form() {
        for kind in [
            SourceKind::SystemIndex,
            SourceKind::TreeFolder,
            SourceKind::NetworkShare,
        ] {
            assert_eq!(SourceKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn unknown_source_kind_is_rejected() {
        assert_eq!(SourceKind::parse("cloud-drive"), None);
    }

    #[test]
    fn file_locator_has_file_scheme() {
        let locator = Locator::for_file(Path::new("/photos/cat.jpg"));
        assert_eq!(locator.scheme(), Some("file"));
        assert_eq!(locator.path(), Some("/photos/cat.jpg"));
    }

    #[test]
    fn share_locator_strips_leading_slash() {
        let locator = Locator::for_share("nas.local", "media", "/holiday/1.jpg");
        assert_eq!(locator.as_str(), "smb://nas.local/media/holiday/1.jpg");
    }

    #[test]
    fn schemeless_locator_has_no_scheme() {
        let locator = Locator::new("just-a-string");
        assert_eq!(locator.scheme(), None);
        assert_eq!(locator.path(), None);
    }
}
