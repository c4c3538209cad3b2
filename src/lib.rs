//! # Gallery Engine
//!
//! A media discovery engine that aggregates items from heterogeneous sources
//! into one deduplicated, day-bucketed timeline.
//!
//! ## Core Philosophy
//! - **Show something fast** - Cached results publish before any scan starts
//! - **Never block on a slow source** - Each scanner works independently
//! - **One item, once** - Identity normalization collapses duplicates that
//!   arrive through different sources
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Scanners, identity normalization, aggregation, and the cache
//! - `events` - Event-driven timeline delivery (UI-ready)
//! - `error` - Per-subsystem error types
//! - `cli` - Command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{GalleryError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
