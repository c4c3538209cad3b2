//! # Identity Normalizer
//!
//! Maps a raw item reference to the stable key used for deduplication.
//!
//! The same physical file can arrive through three different locator shapes
//! depending on which source found it. Normalization is per-source and
//! heuristic: system-index items collapse onto their name + relative path,
//! document-tree items shed the `primary:` volume alias, and everything else
//! keeps its raw locator. Cross-source collapsing beyond that is best-effort
//! by design.

use crate::core::model::{IdentityHint, RawMediaItem, SourceKind};

/// Volume prefix stripped from document ids so the same physical path
/// reached through different volume aliases collapses to one key.
pub const PRIMARY_VOLUME_PREFIX: &str = "primary:";

/// Compute the dedup key for a raw item.
///
/// Pure function of the item's addressable metadata: equivalent inputs yield
/// the same key within one session.
pub fn normalize(item: &RawMediaItem) -> String {
    match item.source {
        SourceKind::SystemIndex => match &item.identity {
            Some(IdentityHint::NamePath {
                relative_path,
                name,
            }) => format!("{}{}", relative_path, name),
            _ => degraded(item),
        },
        SourceKind::TreeFolder => match &item.identity {
            Some(IdentityHint::DocumentId(doc_id)) => doc_id
                .strip_prefix(PRIMARY_VOLUME_PREFIX)
                .unwrap_or(doc_id)
                .to_string(),
            _ => degraded(item),
        },
        // No cross-source collapsing is attempted for share items
        SourceKind::NetworkShare => item.locator.as_str().to_string(),
    }
}

/// Fallback when richer metadata was unavailable. Not fatal, but raises the
/// chance of an undetected duplicate across sources, so leave a trace.
fn degraded(item: &RawMediaItem) -> String {
    tracing::debug!(
        locator = %item.locator,
        source = %item.source,
        "identity normalization fell back to raw locator"
    );
    item.locator.as_str().to_string()
}
