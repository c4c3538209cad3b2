//! # Error Module
//!
//! Error types for the media discovery engine.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - locators, paths, what went wrong
//! - **Recover locally** - a failing source ends its own walk; it never
//!   takes the session down with it

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur inside a source scanner
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scanner was already started; scanners are single-use")]
    AlreadyStarted,

    #[error("Scan root not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Network share {host} unreachable: {reason}")]
    ShareUnreachable { host: String, reason: String },

    #[error("Scan was cancelled")]
    Cancelled,
}

/// Errors that occur in the persistent cache store
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to open cache database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Cache corruption detected at {path}. Delete this file and try again.")]
    Corrupted { path: PathBuf },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, GalleryError>;
