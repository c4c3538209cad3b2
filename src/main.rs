//! # gallery-scan CLI
//!
//! Command-line interface for the gallery engine.
//!
//! ## Usage
//! ```bash
//! gallery-scan scan ~/Pictures --depth 3
//! gallery-scan scan ~/Pictures --output json
//! ```

mod cli;

use gallery_engine::Result;

fn main() -> Result<()> {
    gallery_engine::init_tracing();
    cli::run()
}
