//! # CLI Module
//!
//! Command-line interface for the gallery engine.
//!
//! ## Usage
//! ```bash
//! # Build a timeline from one or more folder trees
//! gallery-scan scan ~/Pictures
//!
//! # Limit recursion depth
//! gallery-scan scan ~/Pictures --depth 3
//!
//! # Newest-first within each day
//! gallery-scan scan ~/Pictures --order newest-first
//!
//! # JSON output
//! gallery-scan scan ~/Pictures --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use gallery_engine::core::aggregator::AggregationEngine;
use gallery_engine::core::cache::{CacheStore, MemoryCacheStore, SqliteCacheStore};
use gallery_engine::core::config::{DayOrder, SessionConfig};
use gallery_engine::core::probe::FsProbe;
use gallery_engine::core::scanner::{MediaScanner, TreeFolderScanner, TreeScanConfig};
use gallery_engine::core::timeline::GalleryItem;
use gallery_engine::error::Result;
use gallery_engine::events::{Event, EventChannel, SessionEvent, TimelineUpdate};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Gallery Engine - One timeline from many sources
#[derive(Parser, Debug)]
#[command(name = "gallery-scan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan folder trees and print the aggregated timeline
    Scan {
        /// Folder trees to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Maximum recursion depth (0 = unlimited)
        #[arg(short, long, default_value = "0")]
        depth: usize,

        /// Include hidden files and directories
        #[arg(long)]
        include_hidden: bool,

        /// Same-day ordering policy
        #[arg(long, default_value = "insertion")]
        order: Order,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Cache database path
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Run without a persistent cache
        #[arg(long, conflicts_with = "cache")]
        no_cache: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Order {
    /// Discovery order within a day (default)
    Insertion,
    /// Most recent timestamp first within a day
    NewestFirst,
}

impl From<Order> for DayOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Insertion => DayOrder::Insertion,
            Order::NewestFirst => DayOrder::NewestFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable timeline with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (locators only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            paths,
            depth,
            include_hidden,
            order,
            output,
            cache,
            no_cache,
        } => run_scan(paths, depth, include_hidden, order.into(), output, cache, no_cache),
    }
}

fn run_scan(
    paths: Vec<PathBuf>,
    depth: usize,
    include_hidden: bool,
    day_order: DayOrder,
    output: OutputFormat,
    cache_path: Option<PathBuf>,
    no_cache: bool,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Gallery Engine").bold().cyan(),
            style("v0.1.0").dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    // Set up the cache store
    let store: Arc<dyn CacheStore> = if no_cache {
        Arc::new(MemoryCacheStore::new())
    } else {
        let cache_path = cache_path.unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("gallery-engine")
                .join("media_cache.db")
        });
        Arc::new(SqliteCacheStore::open(&cache_path)?)
    };

    let config = SessionConfig {
        use_system_index: false,
        tree_roots: paths.clone(),
        share_credentials: Vec::new(),
        max_depth: depth,
        day_order,
    };

    let scanners: Vec<Box<dyn MediaScanner>> = paths
        .iter()
        .map(|path| {
            let mut scan = TreeScanConfig::new(path);
            scan.max_depth = depth;
            scan.include_hidden = include_hidden;
            Box::new(TreeFolderScanner::new(scan)) as Box<dyn MediaScanner>
        })
        .collect();

    let (sender, receiver) = EventChannel::new();
    let engine = AggregationEngine::new(store, Arc::new(FsProbe), config, sender);

    // Spinner for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    engine.load_then_scan(scanners);

    // Drive the session to completion on the main thread
    let mut cached_published = 0;
    let mut discovered = 0;
    loop {
        let event = match receiver.recv() {
            Some(event) => event,
            None => break,
        };
        match event {
            Event::Session(SessionEvent::Started) => {
                if let Some(ref pb) = progress {
                    pb.set_message("replaying cache...");
                }
            }
            Event::Session(SessionEvent::CacheReplayed { published, purged }) => {
                cached_published = published;
                if let Some(ref pb) = progress {
                    pb.set_message(format!(
                        "cache: {} restored, {} purged - scanning...",
                        published, purged
                    ));
                }
            }
            Event::Timeline(TimelineUpdate::Appended { items }) => {
                discovered += items.iter().filter(|i| !i.is_header()).count();
                if let Some(ref pb) = progress {
                    pb.set_message(format!("scanning... {} found", discovered));
                }
            }
            Event::Timeline(TimelineUpdate::Replaced { .. }) => {}
            Event::Session(SessionEvent::ScannerFinished { source }) => {
                tracing::debug!(source = %source, "scanner finished");
            }
            Event::Session(SessionEvent::Settled { .. }) => break,
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let items = engine.snapshot();
    match output {
        OutputFormat::Pretty => print_pretty(&term, &items, cached_published, discovered),
        OutputFormat::Json => print_json(&items),
        OutputFormat::Minimal => print_minimal(&items),
    }

    Ok(())
}

fn print_pretty(term: &Term, items: &[GalleryItem], cached: usize, discovered: usize) {
    let total = items.iter().filter(|i| !i.is_header()).count();

    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();
    term.write_line(&format!(
        "  {} items ({} from cache, {} newly discovered)",
        style(total).cyan(),
        style(cached).dim(),
        style(discovered).dim()
    ))
    .ok();
    term.write_line("").ok();

    if items.is_empty() {
        term.write_line(&format!("  {}", style("No media found").dim()))
            .ok();
        return;
    }

    for item in items {
        match item {
            GalleryItem::Header { day } => {
                term.write_line(&format!("{}", style(day).bold().underlined()))
                    .ok();
            }
            GalleryItem::Entry(record) => {
                term.write_line(&format!(
                    "  {} {}",
                    style(record.source.as_str()).dim(),
                    record.locator
                ))
                .ok();
            }
        }
    }
}

fn print_json(items: &[GalleryItem]) {
    let output = serde_json::json!({
        "total_items": items.iter().filter(|i| !i.is_header()).count(),
        "timeline": items,
    });

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(error = %e, "failed to serialize timeline"),
    }
}

fn print_minimal(items: &[GalleryItem]) {
    for item in items {
        if let GalleryItem::Entry(record) = item {
            println!("{}", record.locator);
        }
    }
}
