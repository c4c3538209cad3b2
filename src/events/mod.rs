//! # Events Module
//!
//! Event-driven delivery of timeline updates to any UI layer.
//!
//! ## Design
//! The engine publishes through a channel, allowing any consumer (CLI, GUI,
//! web) to subscribe. Publishing is fire-and-forget from the engine's
//! perspective: a slow consumer never blocks a scanner worker.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Timeline(update) => render(update),
//!             Event::Session(SessionEvent::Settled { .. }) => break,
//!             _ => {}
//!         }
//!     }
//! });
//!
//! engine.load_then_scan(scanners);
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
