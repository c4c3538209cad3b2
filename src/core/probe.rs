//! Existence-check collaborator used during cache reconciliation.

use crate::core::model::Locator;
use std::path::Path;

/// Answers whether the resource behind a locator still resolves.
///
/// Consulted only during reconciliation, never during live scanning. Hosts
/// with richer resolvers (document trees, share mounts) supply their own
/// implementation.
pub trait ExistenceProbe: Send + Sync {
    fn exists(&self, locator: &Locator) -> bool;
}

/// Filesystem-backed probe: `file` locators stat the path. Other schemes
/// cannot be resolved locally, so they are assumed present; purging a record
/// this probe cannot check is worse than republishing a dead one.
pub struct FsProbe;

impl ExistenceProbe for FsProbe {
    fn exists(&self, locator: &Locator) -> bool {
        match locator.scheme() {
            Some("file") => locator.path().map(|p| Path::new(p).exists()).unwrap_or(false),
            _ => true,
        }
    }
}
