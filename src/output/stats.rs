//! Run statistics
//!
//! Live counters shared across workers, plus the end-of-run and `--stats`
//! reports.

use crate::sink::CorpusStats;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by workers during a run
#[derive(Debug, Default)]
pub struct RunStats {
    /// Poems successfully extracted and handed to the sink
    pub emitted: AtomicU64,

    /// Pages processed but not emitted (non-poem roles, parse failures)
    pub skipped: AtomicU64,

    /// Pages that failed with a recoverable per-item error
    pub failed: AtomicU64,

    /// Collection pages expanded into children
    pub collections_expanded: AtomicU64,

    /// Hub pages expanded into version links
    pub hubs_expanded: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_emitted(&self) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_collection(&self) {
        self.collections_expanded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hub(&self) {
        self.hubs_expanded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn emitted_count(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    pub fn skipped_count(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}

/// Prints the end-of-run summary
///
/// `written` is the sink's count of durable records, which is authoritative
/// over the live counter.
pub fn print_run_summary(stats: &RunStats, written: u64, elapsed: std::time::Duration) {
    tracing::info!("Crawl finished in {:?}", elapsed);
    tracing::info!("Total poems processed and saved: {}", written);
    tracing::info!(
        "Total pages skipped (non-poem, collection, etc.): {}",
        stats.skipped.load(Ordering::Relaxed)
    );
    tracing::info!(
        "Failed items: {}, collections expanded: {}, hubs expanded: {}",
        stats.failed.load(Ordering::Relaxed),
        stats.collections_expanded.load(Ordering::Relaxed),
        stats.hubs_expanded.load(Ordering::Relaxed)
    );
}

/// Prints the `--stats` report from an existing index
pub fn print_corpus_stats(stats: &CorpusStats) {
    println!("=== Corpus Statistics ===\n");
    println!("Total poems:          {}", stats.total_poems);
    println!("Distinct authors:     {}", stats.distinct_authors);
    println!("Distinct collections: {}", stats.distinct_collections);
    println!("Hub-grouped poems:    {}", stats.hub_grouped_poems);
    println!("Duplicate checksums:  {}", stats.duplicate_checksums);
}
